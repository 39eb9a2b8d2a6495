//! The SQLite implementation of [`Session`].

use std::path::Path;

use rusqlite::{Connection, params_from_iter};
use ward_core::{
  store::Session,
  value::{Row, Value},
};

use crate::{
  encode::{check_savepoint_name, decode_value, encode_params},
  schema::SCHEMA,
  Result,
};

// ─── Session ─────────────────────────────────────────────────────────────────

/// One connection to a Ward store in a single SQLite file.
///
/// The connection closes when the session is dropped; SQLite rolls back any
/// transaction still open at that point.
pub struct SqliteSession {
  conn: Connection,
}

impl SqliteSession {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let session = Self { conn: Connection::open(path)? };
    session.init_schema()?;
    Ok(session)
  }

  /// Open a store that lives only as long as the session.
  pub fn open_in_memory() -> Result<Self> {
    let session = Self { conn: Connection::open_in_memory()? };
    session.init_schema()?;
    Ok(session)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(SCHEMA)?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  fn control(&self, sql: &str) -> Result<()> {
    self.conn.execute_batch(sql)?;
    Ok(())
  }
}

// ─── Session impl ────────────────────────────────────────────────────────────

impl Session for SqliteSession {
  type Error = crate::Error;

  // ── Statements ────────────────────────────────────────────────────────────

  fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    Ok(stmt.execute(params_from_iter(encode_params(params)))?)
  }

  fn execute_many(&mut self, sql: &str, rows: &[&[Value]]) -> Result<usize> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let mut affected = 0;
    for row in rows {
      affected += stmt.execute(params_from_iter(encode_params(row)))?;
    }
    Ok(affected)
  }

  fn fetch_one(&mut self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
    Ok(self.fetch_all(sql, params)?.into_iter().next())
  }

  fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
    let mut stmt = self.conn.prepare_cached(sql)?;
    let width = stmt.column_count();
    let mut rows = stmt.query(params_from_iter(encode_params(params)))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
      let decoded = (0..width)
        .map(|i| decode_value(i, row.get_ref(i)?))
        .collect::<Result<Row>>()?;
      out.push(decoded);
    }
    Ok(out)
  }

  // ── Transactions ──────────────────────────────────────────────────────────

  fn begin(&mut self) -> Result<()> { self.control("BEGIN") }

  fn commit(&mut self) -> Result<()> { self.control("COMMIT") }

  fn rollback(&mut self) -> Result<()> { self.control("ROLLBACK") }

  fn savepoint(&mut self, name: &str) -> Result<()> {
    check_savepoint_name(name)?;
    self.control(&format!("SAVEPOINT {name}"))
  }

  fn release(&mut self, name: &str) -> Result<()> {
    check_savepoint_name(name)?;
    self.control(&format!("RELEASE SAVEPOINT {name}"))
  }

  fn rollback_to(&mut self, name: &str) -> Result<()> {
    check_savepoint_name(name)?;
    // ROLLBACK TO leaves the savepoint on the stack; pop it too.
    self.control(&format!(
      "ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}"
    ))
  }
}
