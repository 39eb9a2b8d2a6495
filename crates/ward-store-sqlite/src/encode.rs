//! Encoding and decoding between [`ward_core::value::Value`] and SQLite's
//! storage classes.
//!
//! Dates are stored as `YYYY-MM-DD` text and booleans as `0`/`1`, so reading
//! them back yields `Text` and `Integer` respectively.

use rusqlite::types::{Value as SqlValue, ValueRef};
use ward_core::{validate::DATE_FORMAT, value::Value};

use crate::{Error, Result};

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(f) => SqlValue::Real(*f),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
  }
}

pub fn encode_params(values: &[Value]) -> Vec<SqlValue> {
  values.iter().map(encode_value).collect()
}

pub fn decode_value(column: usize, raw: ValueRef<'_>) -> Result<Value> {
  match raw {
    ValueRef::Null => Ok(Value::Null),
    ValueRef::Integer(i) => Ok(Value::Integer(i)),
    ValueRef::Real(f) => Ok(Value::Real(f)),
    ValueRef::Text(bytes) => {
      Ok(Value::Text(String::from_utf8_lossy(bytes).into_owned()))
    }
    ValueRef::Blob(_) => Err(Error::UnsupportedColumn { column, kind: "blob" }),
  }
}

/// Savepoint names are interpolated into SQL, so only identifiers pass.
pub fn check_savepoint_name(name: &str) -> Result<()> {
  let valid = !name.is_empty()
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    && !name.starts_with(|c: char| c.is_ascii_digit());
  if valid {
    Ok(())
  } else {
    Err(Error::InvalidSavepoint(name.to_owned()))
  }
}
