//! Backend-neutral parameter and column values.
//!
//! Every statement parameter and every fetched column passes through
//! [`Value`]. Backends map it onto their native types; dates travel as
//! calendar dates and are encoded by the backend.

use chrono::NaiveDate;
use serde::Serialize;

use crate::{Error, Result};

/// A single SQL parameter or result column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Bool(bool),
  Date(NaiveDate),
}

/// One fetched result row, columns in `SELECT` order.
pub type Row = Vec<Value>;

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

  /// Short type name used in error messages.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Integer(_) => "integer",
      Self::Real(_) => "real",
      Self::Text(_) => "text",
      Self::Bool(_) => "bool",
      Self::Date(_) => "date",
    }
  }

  pub fn as_i64(&self) -> Result<i64> {
    match self {
      Self::Integer(i) => Ok(*i),
      Self::Bool(b) => Ok(i64::from(*b)),
      other => Err(Error::UnexpectedValue {
        expected: "integer",
        found:    other.kind(),
      }),
    }
  }

  /// Numeric value; `NULL` (e.g. `SUM` over no rows) reads as `None`.
  pub fn as_f64(&self) -> Result<Option<f64>> {
    match self {
      Self::Null => Ok(None),
      Self::Real(f) => Ok(Some(*f)),
      Self::Integer(i) => Ok(Some(*i as f64)),
      other => Err(Error::UnexpectedValue {
        expected: "real",
        found:    other.kind(),
      }),
    }
  }

  pub fn as_text(&self) -> Result<&str> {
    match self {
      Self::Text(s) => Ok(s),
      other => Err(Error::UnexpectedValue {
        expected: "text",
        found:    other.kind(),
      }),
    }
  }

  /// Text rendering for report output; `NULL` renders as an empty string.
  pub fn display(&self) -> String {
    match self {
      Self::Null => String::new(),
      Self::Integer(i) => i.to_string(),
      Self::Real(f) => format!("{f:.2}"),
      Self::Text(s) => s.clone(),
      Self::Bool(b) => b.to_string(),
      Self::Date(d) => d.to_string(),
    }
  }
}

// ─── Conversions ─────────────────────────────────────────────────────────────

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self { Self::Real(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<NaiveDate> for Value {
  fn from(v: NaiveDate) -> Self { Self::Date(v) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn option_none_becomes_null() {
    let v: Value = Option::<f64>::None.into();
    assert!(v.is_null());
    assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
  }

  #[test]
  fn accessors_report_mismatched_kind() {
    let err = Value::Text("7".into()).as_i64().unwrap_err();
    assert!(matches!(
      err,
      Error::UnexpectedValue { expected: "integer", found: "text" }
    ));
    assert_eq!(Value::Integer(3).as_f64().unwrap(), Some(3.0));
    assert_eq!(Value::Null.as_f64().unwrap(), None);
  }
}
