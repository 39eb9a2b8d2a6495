//! Error type for `ward-ingest`.
//!
//! Only failures outside the per-row boundary end up here; a rejected row is
//! a [`ward_core::reject::Reason`], not an error.

use std::path::PathBuf;

use thiserror::Error;
use ward_core::table::Table;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ward_core::Error),

  #[error("failed to read extract {path:?}: {source}")]
  Extract {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("extract is missing required column {0:?}")]
  MissingColumn(String),

  #[error("{0} is not keyed by facility and date")]
  UndatedTable(Table),

  #[error("failed to write recovery file {path:?}: {source}")]
  Recovery {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a generic [`Session`](ward_core::store::Session).
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
