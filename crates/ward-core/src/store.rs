//! The `Session` trait and the scoped [`Transaction`] guard.
//!
//! The trait is implemented by storage backends (e.g. `ward-store-sqlite`).
//! The ingestion pipeline depends on this abstraction, not on any concrete
//! backend. A session is one connection used by exactly one writer.

use std::ops::{Deref, DerefMut};

use crate::value::{Row, Value};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Parameterized statement execution plus explicit transaction control.
///
/// Statements use positional `?` placeholders. Savepoints nest inside an open
/// transaction; [`Session::rollback_to`] discards the work done since the
/// savepoint and removes it.
pub trait Session {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Statements ──────────────────────────────────────────────────────────

  /// Execute one statement, returning the number of affected rows.
  fn execute(
    &mut self,
    sql: &str,
    params: &[Value],
  ) -> Result<usize, Self::Error>;

  /// Execute one statement once per parameter row. Stops at the first error.
  fn execute_many(
    &mut self,
    sql: &str,
    rows: &[&[Value]],
  ) -> Result<usize, Self::Error>;

  /// Return the first result row, if any.
  fn fetch_one(
    &mut self,
    sql: &str,
    params: &[Value],
  ) -> Result<Option<Row>, Self::Error>;

  fn fetch_all(
    &mut self,
    sql: &str,
    params: &[Value],
  ) -> Result<Vec<Row>, Self::Error>;

  // ── Transactions ────────────────────────────────────────────────────────

  fn begin(&mut self) -> Result<(), Self::Error>;

  fn commit(&mut self) -> Result<(), Self::Error>;

  fn rollback(&mut self) -> Result<(), Self::Error>;

  fn savepoint(&mut self, name: &str) -> Result<(), Self::Error>;

  /// Keep the work done since `name` and remove the savepoint.
  fn release(&mut self, name: &str) -> Result<(), Self::Error>;

  fn rollback_to(&mut self, name: &str) -> Result<(), Self::Error>;
}

// ─── Transaction guard ───────────────────────────────────────────────────────

#[derive(Debug)]
enum Scope {
  Root,
  Savepoint(String),
}

/// A unit of work that rolls back when dropped unless committed.
///
/// The root guard wraps `BEGIN`/`COMMIT`; [`Transaction::nested`] opens a
/// savepoint that borrows the parent, so nested units can never interleave.
pub struct Transaction<'s, S: Session> {
  session: &'s mut S,
  scope:   Scope,
  open:    bool,
}

impl<'s, S: Session> Transaction<'s, S> {
  /// Open a top-level transaction on `session`.
  pub fn begin(session: &'s mut S) -> Result<Self, S::Error> {
    session.begin()?;
    Ok(Self { session, scope: Scope::Root, open: true })
  }

  /// Open a nested unit of work (a savepoint named `name`).
  pub fn nested(&mut self, name: &str) -> Result<Transaction<'_, S>, S::Error> {
    self.session.savepoint(name)?;
    Ok(Transaction {
      session: &mut *self.session,
      scope:   Scope::Savepoint(name.to_owned()),
      open:    true,
    })
  }

  /// Make the unit's work permanent (or fold it into the parent).
  ///
  /// If the commit itself fails the guard stays open and rolls back on drop.
  pub fn commit(mut self) -> Result<(), S::Error> {
    let result = match &self.scope {
      Scope::Root => self.session.commit(),
      Scope::Savepoint(name) => self.session.release(name),
    };
    if result.is_ok() {
      self.open = false;
    }
    result
  }

  pub fn rollback(mut self) -> Result<(), S::Error> {
    self.open = false;
    self.undo()
  }

  fn undo(&mut self) -> Result<(), S::Error> {
    match &self.scope {
      Scope::Root => self.session.rollback(),
      Scope::Savepoint(name) => self.session.rollback_to(name),
    }
  }
}

impl<S: Session> Deref for Transaction<'_, S> {
  type Target = S;

  fn deref(&self) -> &S { self.session }
}

impl<S: Session> DerefMut for Transaction<'_, S> {
  fn deref_mut(&mut self) -> &mut S { self.session }
}

impl<S: Session> Drop for Transaction<'_, S> {
  fn drop(&mut self) {
    if !self.open {
      return;
    }
    if let Err(e) = self.undo() {
      tracing::warn!(scope = ?self.scope, "rollback on drop failed: {e}");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// Records every transaction-control call; statements are no-ops.
  #[derive(Default)]
  struct Journal {
    calls: Vec<String>,
  }

  #[derive(Debug, thiserror::Error)]
  #[error("unused")]
  struct Never;

  impl Session for Journal {
    type Error = Never;

    fn execute(&mut self, _: &str, _: &[Value]) -> Result<usize, Never> {
      Ok(0)
    }

    fn execute_many(&mut self, _: &str, _: &[&[Value]]) -> Result<usize, Never> {
      Ok(0)
    }

    fn fetch_one(&mut self, _: &str, _: &[Value]) -> Result<Option<Row>, Never> {
      Ok(None)
    }

    fn fetch_all(&mut self, _: &str, _: &[Value]) -> Result<Vec<Row>, Never> {
      Ok(Vec::new())
    }

    fn begin(&mut self) -> Result<(), Never> {
      self.calls.push("begin".into());
      Ok(())
    }

    fn commit(&mut self) -> Result<(), Never> {
      self.calls.push("commit".into());
      Ok(())
    }

    fn rollback(&mut self) -> Result<(), Never> {
      self.calls.push("rollback".into());
      Ok(())
    }

    fn savepoint(&mut self, name: &str) -> Result<(), Never> {
      self.calls.push(format!("savepoint {name}"));
      Ok(())
    }

    fn release(&mut self, name: &str) -> Result<(), Never> {
      self.calls.push(format!("release {name}"));
      Ok(())
    }

    fn rollback_to(&mut self, name: &str) -> Result<(), Never> {
      self.calls.push(format!("rollback_to {name}"));
      Ok(())
    }
  }

  #[test]
  fn dropped_root_rolls_back() {
    let mut journal = Journal::default();
    {
      let _tx = Transaction::begin(&mut journal).unwrap();
    }
    assert_eq!(journal.calls, ["begin", "rollback"]);
  }

  #[test]
  fn nested_units_release_or_roll_back() {
    let mut journal = Journal::default();
    {
      let mut tx = Transaction::begin(&mut journal).unwrap();
      tx.nested("a").unwrap().commit().unwrap();
      tx.nested("b").unwrap().rollback().unwrap();
      {
        let _dropped = tx.nested("c").unwrap();
      }
      tx.commit().unwrap();
    }
    assert_eq!(journal.calls, [
      "begin",
      "savepoint a",
      "release a",
      "savepoint b",
      "rollback_to b",
      "savepoint c",
      "rollback_to c",
      "commit",
    ]);
  }
}
