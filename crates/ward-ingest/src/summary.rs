//! Run summaries.

use std::{collections::BTreeMap, fmt, path::PathBuf, time::Duration};

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use uuid::Uuid;
use ward_core::{
  reject::{ReasonCode, RejectedRow},
  table::Table,
};

/// Which extract a run loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoadKind {
  Hhs,
  Quality,
}

impl LoadKind {
  /// File name of the recovery CSV inside the recovery directory.
  pub fn recovery_file(self) -> &'static str {
    match self {
      Self::Hhs => "hhs.csv",
      Self::Quality => "quality.csv",
    }
  }

  pub fn tables(self) -> &'static [Table] {
    match self {
      Self::Hhs => &[
        Table::Facilities,
        Table::FacilityLocations,
        Table::BedCapacitySnapshots,
      ],
      Self::Quality => &[Table::QualityRatings],
    }
  }
}

/// Per-table outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
  pub inserted:     usize,
  pub duplicates:   usize,
  pub invalid:      usize,
  pub store_errors: usize,
}

impl TableCounts {
  pub fn rejected(&self) -> usize {
    self.duplicates + self.invalid + self.store_errors
  }

  pub(crate) fn record(&mut self, code: ReasonCode) {
    match code {
      ReasonCode::Duplicate => self.duplicates += 1,
      ReasonCode::Invalid => self.invalid += 1,
      ReasonCode::Store => self.store_errors += 1,
    }
  }
}

/// The result of a completed load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
  pub run_id:        Uuid,
  pub kind:          LoadKind,
  pub source:        PathBuf,
  pub total_rows:    usize,
  pub tables:        BTreeMap<Table, TableCounts>,
  /// Distinct source rows written to the recovery file.
  pub recovered:     usize,
  pub recovery_path: PathBuf,
  #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
  pub elapsed:       Duration,
  /// Every rejection, in the order it was decided.
  #[serde(skip)]
  pub rejections:    Vec<RejectedRow>,
}

impl LoadSummary {
  pub fn counts(&self, table: Table) -> TableCounts {
    self.tables.get(&table).copied().unwrap_or_default()
  }

  pub fn inserted(&self) -> usize {
    self.tables.values().map(|c| c.inserted).sum()
  }
}

impl fmt::Display for LoadSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "{} load {} finished in {:.2}s",
      self.kind,
      self.run_id,
      self.elapsed.as_secs_f64()
    )?;
    writeln!(f, "Total rows processed: {}", self.total_rows)?;
    for (table, c) in &self.tables {
      writeln!(
        f,
        "{table}: {} inserted, {} duplicates, {} invalid, {} store errors",
        c.inserted, c.duplicates, c.invalid, c.store_errors
      )?;
    }
    write!(
      f,
      "{} rejected rows written to {}",
      self.recovered,
      self.recovery_path.display()
    )
  }
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
  s.serialize_f64(d.as_secs_f64())
}
