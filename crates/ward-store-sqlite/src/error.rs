//! Error type for `ward-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("unsupported column type {kind} at position {column}")]
  UnsupportedColumn { column: usize, kind: &'static str },

  #[error("invalid savepoint name {0:?}")]
  InvalidSavepoint(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
