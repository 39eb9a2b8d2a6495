//! Load tuning shared by both loaders.

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
  /// Rows per atomic insert; also the IN-list size for batch duplicate
  /// queries.
  pub batch_size:   usize,
  /// Directory receiving `hhs.csv` / `quality.csv` recovery files.
  pub recovery_dir: PathBuf,
}

impl Default for LoadConfig {
  fn default() -> Self {
    Self {
      batch_size:   DEFAULT_BATCH_SIZE,
      recovery_dir: PathBuf::from("invalid_data"),
    }
  }
}
