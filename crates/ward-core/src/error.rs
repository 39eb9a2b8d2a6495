//! Error types for `ward-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("expected a {expected} column value, found {found}")]
  UnexpectedValue {
    expected: &'static str,
    found:    &'static str,
  },

  #[error("query returned no rows")]
  NoRows,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
