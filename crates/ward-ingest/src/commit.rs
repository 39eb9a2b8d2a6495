//! Batch insertion with a row-by-row fallback.
//!
//! A batch is one nested unit of work. If the store refuses any row the whole
//! unit is rolled back and every row is retried in its own unit, so a single
//! bad row costs one batch its atomicity but never the other rows.

use ward_core::{
  facility::RowIndex,
  store::{Session, Transaction},
  value::Value,
};

use crate::{Error, Result};

const BATCH_SAVEPOINT: &str = "ward_batch";
const ROW_SAVEPOINT: &str = "ward_row";

/// A validated row waiting to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRow {
  pub index:  RowIndex,
  pub params: Vec<Value>,
}

/// What happened to the rows handed to [`commit_batch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
  pub inserted: usize,
  /// Rows the store refused individually, with the store's message.
  pub failed:   Vec<(RowIndex, String)>,
}

impl BatchOutcome {
  fn merge(&mut self, other: BatchOutcome) {
    self.inserted += other.inserted;
    self.failed.extend(other.failed);
  }
}

/// Insert `rows` with `sql` as one atomic unit, falling back to one unit per
/// row if the store rejects the batch.
///
/// Only failures of transaction control itself are returned as errors.
pub fn commit_batch<S: Session>(
  tx: &mut Transaction<'_, S>,
  sql: &str,
  rows: &[PendingRow],
) -> Result<BatchOutcome> {
  if rows.is_empty() {
    return Ok(BatchOutcome::default());
  }

  let params: Vec<&[Value]> = rows.iter().map(|r| r.params.as_slice()).collect();
  let mut unit = tx.nested(BATCH_SAVEPOINT).map_err(Error::store)?;
  match unit.execute_many(sql, &params) {
    Ok(_) => {
      unit.commit().map_err(Error::store)?;
      return Ok(BatchOutcome { inserted: rows.len(), failed: Vec::new() });
    }
    Err(e) => {
      tracing::debug!(rows = rows.len(), "batch refused, retrying per row: {e}");
      unit.rollback().map_err(Error::store)?;
    }
  }

  let mut outcome = BatchOutcome::default();
  for row in rows {
    let mut unit = tx.nested(ROW_SAVEPOINT).map_err(Error::store)?;
    match unit.execute(sql, &row.params) {
      Ok(_) => {
        unit.commit().map_err(Error::store)?;
        outcome.inserted += 1;
      }
      Err(e) => {
        unit.rollback().map_err(Error::store)?;
        outcome.failed.push((row.index, e.to_string()));
      }
    }
  }
  Ok(outcome)
}

/// [`commit_batch`] over consecutive chunks of `batch_size` rows, in order.
pub fn commit_chunked<S: Session>(
  tx: &mut Transaction<'_, S>,
  sql: &str,
  rows: &[PendingRow],
  batch_size: usize,
) -> Result<BatchOutcome> {
  let mut total = BatchOutcome::default();
  for (batch, chunk) in rows.chunks(batch_size.max(1)).enumerate() {
    let outcome = commit_batch(tx, sql, chunk)?;
    tracing::debug!(
      batch,
      rows = chunk.len(),
      inserted = outcome.inserted,
      failed = outcome.failed.len(),
      "batch done"
    );
    total.merge(outcome);
  }
  Ok(total)
}
