//! Row rejection taxonomy.
//!
//! Duplicates and validation failures are plain values threaded through the
//! pipeline. Only failures outside the per-row boundary become crate
//! [`Error`]s.
//!
//! [`Error`]: crate::Error

use std::fmt;

use serde::Serialize;

use crate::{facility::RowIndex, table::Table};

/// Why a row was not loaded into a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
  /// The natural key is already present in the store (or earlier in the same
  /// extract).
  Duplicate,
  /// A semantic rule or type coercion failed for `field`.
  Invalid { field: String, detail: String },
  /// The store refused the row even on its own (e.g. a constraint violation).
  Store { message: String },
}

impl Reason {
  pub fn invalid(field: impl Into<String>, detail: impl Into<String>) -> Self {
    Self::Invalid { field: field.into(), detail: detail.into() }
  }

  /// Counter bucket this reason belongs to.
  pub fn code(&self) -> ReasonCode {
    match self {
      Self::Duplicate => ReasonCode::Duplicate,
      Self::Invalid { .. } => ReasonCode::Invalid,
      Self::Store { .. } => ReasonCode::Store,
    }
  }
}

impl fmt::Display for Reason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Duplicate => write!(f, "duplicate key"),
      Self::Invalid { field, detail } => write!(f, "invalid {field}: {detail}"),
      Self::Store { message } => write!(f, "store rejected row: {message}"),
    }
  }
}

/// Reason without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
  Duplicate,
  Invalid,
  Store,
}

/// Either the accepted value or the reason it was turned away.
pub type Checked<T> = std::result::Result<T, Reason>;

/// A source row that failed to load into one table.
///
/// The original raw record is not copied here; the recovery writer slices it
/// out of the untouched extract by `index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
  pub index:  RowIndex,
  pub table:  Table,
  pub reason: Reason,
}

impl fmt::Display for RejectedRow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "row {} ({}): {}", self.index, self.table, self.reason)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_names_field() {
    let row = RejectedRow {
      index:  3,
      table:  Table::BedCapacitySnapshots,
      reason: Reason::invalid("total_icu_beds_7_day_avg", "-5 is negative"),
    };
    assert_eq!(
      row.to_string(),
      "row 3 (bed_capacity_snapshots): invalid total_icu_beds_7_day_avg: -5 \
       is negative"
    );
  }

  #[test]
  fn serializes_with_kind_tag() {
    let json = serde_json::to_value(Reason::Duplicate).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "duplicate" }));
    assert_eq!(Reason::Store { message: "x".into() }.code(), ReasonCode::Store);
  }
}
