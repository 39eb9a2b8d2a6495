//! Duplicate detection against the store.
//!
//! Read-only: these functions only ever issue `SELECT`s, and the loaders call
//! them between batch units, never inside one.

use std::collections::HashSet;

use chrono::NaiveDate;
use ward_core::{facility::NaturalKey, store::Session, table::Table, value::Value};

use crate::{Error, Result};

/// Whether a row with `key` already exists in `table` (point lookup on one or
/// two key columns).
pub fn exists<S: Session>(
  session: &mut S,
  table: Table,
  key: &NaturalKey,
) -> Result<bool> {
  let params = key.params();
  debug_assert_eq!(params.len(), table.key_columns().len());

  let conditions = table
    .key_columns()
    .iter()
    .map(|column| format!("{column} = ?"))
    .collect::<Vec<_>>()
    .join(" AND ");
  let sql = format!("SELECT COUNT(*) FROM {} WHERE {conditions}", table.name());

  let row = session
    .fetch_one(&sql, &params)
    .map_err(Error::store)?
    .ok_or(ward_core::Error::NoRows)?;
  let count = row.first().ok_or(ward_core::Error::NoRows)?.as_i64()?;
  Ok(count > 0)
}

/// Which of `facility_ids` already have a row in `table` dated `date`.
///
/// One `IN (…)` query per `chunk_size` identifiers instead of one round trip
/// per row.
pub fn existing_on<S: Session>(
  session: &mut S,
  table: Table,
  facility_ids: &[String],
  date: NaiveDate,
  chunk_size: usize,
) -> Result<HashSet<String>> {
  let &[id_column, date_column] = table.key_columns() else {
    return Err(Error::UndatedTable(table));
  };

  let mut found = HashSet::new();
  for chunk in facility_ids.chunks(chunk_size.max(1)) {
    let placeholders = vec!["?"; chunk.len()].join(", ");
    let sql = format!(
      "SELECT {id_column} FROM {} WHERE {id_column} IN ({placeholders}) AND \
       {date_column} = ?",
      table.name(),
    );

    let mut params: Vec<Value> =
      chunk.iter().map(|id| Value::from(id.as_str())).collect();
    params.push(date.into());

    for row in session.fetch_all(&sql, &params).map_err(Error::store)? {
      let id = row.first().ok_or(ward_core::Error::NoRows)?.as_text()?;
      found.insert(id.to_owned());
    }
  }
  Ok(found)
}
