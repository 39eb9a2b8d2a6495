//! Load orchestration shared by the HHS and quality loaders.
//!
//! Every destination table runs the same per-row state machine:
//!
//! ```text
//! Pending ─► duplicate? ──yes──► Rejected(Duplicate)
//!               │ no
//!               ▼
//!            valid? ─────no───► Rejected(Invalid)
//!               │ yes
//!               ▼
//!           batch insert ──────► Inserted | Rejected(Store)
//! ```
//!
//! A whole run is one outer transaction; batches and row retries are nested
//! units inside it. The outer transaction commits only once every table has
//! been processed.

pub mod hhs;
pub mod quality;

use std::{
  collections::{BTreeMap, BTreeSet, HashMap, HashSet},
  path::Path,
  time::Instant,
};

use uuid::Uuid;
use ward_core::{
  facility::{NaturalKey, Record, RowIndex},
  reject::{Checked, Reason, RejectedRow},
  store::{Session, Transaction},
  table::Table,
};

use crate::{
  commit::{PendingRow, commit_chunked},
  config::LoadConfig,
  duplicate,
  extract::Extract,
  recovery::{StagedRecovery, stage_recovery},
  summary::{LoadKind, LoadSummary, TableCounts},
  Result,
};

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// A source row mapped for one table, before any checks.
///
/// `key` fails when the natural-key fields themselves cannot be read;
/// `record` fails when any other field cannot be coerced.
pub(crate) struct Draft<T> {
  pub index:  RowIndex,
  pub key:    Checked<NaturalKey>,
  pub record: Checked<T>,
}

impl<T> Draft<T> {
  /// A row that could not be read at all.
  pub fn refused(index: RowIndex, reason: Reason) -> Self {
    Self { index, key: Err(reason.clone()), record: Err(reason) }
  }
}

/// Where the duplicate check looks.
pub(crate) enum Existing {
  /// One point lookup per row.
  Lookup,
  /// Facility identifiers already known to be present for the load's date.
  Known(HashSet<String>),
}

impl Existing {
  fn contains<S: Session>(
    &self,
    session: &mut S,
    table: Table,
    key: &NaturalKey,
  ) -> Result<bool> {
    match self {
      Self::Lookup => duplicate::exists(session, table, key),
      Self::Known(ids) => Ok(ids.contains(&key.facility_id)),
    }
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Counters, rejections, and keys inserted so far in one run.
pub(crate) struct Ledger {
  counts:     BTreeMap<Table, TableCounts>,
  rejections: Vec<RejectedRow>,
  admitted:   HashMap<Table, HashSet<NaturalKey>>,
}

impl Ledger {
  pub fn new(tables: &[Table]) -> Self {
    Self {
      counts:     tables.iter().map(|t| (*t, TableCounts::default())).collect(),
      rejections: Vec::new(),
      admitted:   HashMap::new(),
    }
  }

  fn reject(&mut self, index: RowIndex, table: Table, reason: Reason) {
    tracing::warn!(row = index, %table, "skipping row: {reason}");
    self.counts.entry(table).or_default().record(reason.code());
    self.rejections.push(RejectedRow { index, table, reason });
  }

  fn inserted(&mut self, table: Table, rows: usize) {
    self.counts.entry(table).or_default().inserted += rows;
  }

  fn seen(&self, table: Table, key: &NaturalKey) -> bool {
    self.admitted.get(&table).is_some_and(|keys| keys.contains(key))
  }

  fn admit(&mut self, table: Table, key: NaturalKey) {
    self.admitted.entry(table).or_default().insert(key);
  }
}

// ─── Per-table pipeline ──────────────────────────────────────────────────────

/// Run every draft for `T::TABLE` through the state machine and insert the
/// survivors in batches.
///
/// A key counts as seen only once a row carrying it has been inserted. A
/// later row repeating a key still waiting in the current pass is held back
/// until that pass commits: it is a duplicate if the first row went in, and
/// takes its place in the next pass if the store refused it.
pub(crate) fn load_table<S, T, V>(
  tx: &mut Transaction<'_, S>,
  ledger: &mut Ledger,
  drafts: Vec<Draft<T>>,
  existing: &Existing,
  validate: V,
  batch_size: usize,
) -> Result<()>
where
  S: Session,
  T: Record,
  V: Fn(&T) -> Checked<()>,
{
  let table = T::TABLE;
  let sql = table.insert_sql();
  let mut candidates = drafts;
  let mut inserted = 0;

  for pass in 0usize.. {
    if candidates.is_empty() {
      break;
    }

    let mut pending = Vec::with_capacity(candidates.len());
    let mut queued: HashMap<NaturalKey, RowIndex> = HashMap::new();
    let mut held = Vec::new();

    for draft in candidates {
      let key = match draft.key {
        Ok(key) => key,
        Err(reason) => {
          ledger.reject(draft.index, table, reason);
          continue;
        }
      };

      if ledger.seen(table, &key) || existing.contains(&mut **tx, table, &key)? {
        ledger.reject(draft.index, table, Reason::Duplicate);
        continue;
      }
      if queued.contains_key(&key) {
        held.push(Draft { index: draft.index, key: Ok(key), record: draft.record });
        continue;
      }

      match draft.record.and_then(|record| validate(&record).map(|()| record)) {
        Ok(record) => {
          debug_assert_eq!(record.key(), key);
          queued.insert(key, draft.index);
          pending.push(PendingRow { index: draft.index, params: record.params() });
        }
        Err(reason) => ledger.reject(draft.index, table, reason),
      }
    }

    let outcome = commit_chunked(tx, &sql, &pending, batch_size)?;
    let refused: HashSet<RowIndex> = outcome.failed.iter().map(|(i, _)| *i).collect();
    for (key, index) in queued {
      if !refused.contains(&index) {
        ledger.admit(table, key);
      }
    }
    for (index, message) in outcome.failed {
      ledger.reject(index, table, Reason::Store { message });
    }
    inserted += outcome.inserted;

    if !held.is_empty() {
      tracing::debug!(%table, pass, held = held.len(), "re-checking repeated keys");
    }
    candidates = held;
  }

  ledger.inserted(table, inserted);
  tracing::info!(%table, inserted, "table loaded");
  Ok(())
}

// ─── Run bookkeeping ─────────────────────────────────────────────────────────

/// Identity and timing of one run.
pub(crate) struct Run<'a> {
  pub kind:    LoadKind,
  pub id:      Uuid,
  pub source:  &'a Path,
  pub started: Instant,
}

impl<'a> Run<'a> {
  pub fn start(kind: LoadKind, source: &'a Path) -> Self {
    Self { kind, id: Uuid::new_v4(), source, started: Instant::now() }
  }

  /// Write the recovery file to a staging location. Called while the run's
  /// transaction is still open, so a failure here rolls the run back.
  pub fn stage(
    &self,
    extract: &Extract,
    ledger: &Ledger,
    config: &LoadConfig,
  ) -> Result<StagedRecovery> {
    let indices: BTreeSet<RowIndex> =
      ledger.rejections.iter().map(|r| r.index).collect();
    let path = config.recovery_dir.join(self.kind.recovery_file());
    stage_recovery(&path, extract, &indices)
  }

  /// Move the staged recovery file into place and assemble the summary.
  pub fn finish(
    self,
    total_rows: usize,
    ledger: Ledger,
    staged: StagedRecovery,
  ) -> Result<LoadSummary> {
    let recovered = staged.rows();
    let recovery_path = staged.persist()?;

    let summary = LoadSummary {
      run_id: self.id,
      kind: self.kind,
      source: self.source.to_path_buf(),
      total_rows,
      tables: ledger.counts,
      recovered,
      recovery_path,
      elapsed: self.started.elapsed(),
      rejections: ledger.rejections,
    };

    tracing::info!(
      total_rows = summary.total_rows,
      inserted = summary.inserted(),
      recovered = summary.recovered,
      elapsed_secs = summary.elapsed.as_secs_f64(),
      "data loaded"
    );
    for (table, counts) in &summary.tables {
      tracing::info!(
        %table,
        inserted = counts.inserted,
        duplicates = counts.duplicates,
        invalid = counts.invalid,
        store_errors = counts.store_errors,
        "table summary"
      );
    }
    Ok(summary)
  }
}
