//! Layered configuration: defaults, then the optional TOML file, then
//! `WARD_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use ward_ingest::LoadConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WardConfig {
  pub store_path:   PathBuf,
  pub batch_size:   usize,
  pub recovery_dir: PathBuf,
}

impl Default for WardConfig {
  fn default() -> Self {
    let load = LoadConfig::default();
    Self {
      store_path:   PathBuf::from("ward.db"),
      batch_size:   load.batch_size,
      recovery_dir: load.recovery_dir,
    }
  }
}

impl WardConfig {
  /// Read `path` if it exists and overlay the environment on top.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("WARD").try_parsing(true))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise WardConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.recovery_dir = expand_tilde(&cfg.recovery_dir);

    anyhow::ensure!(cfg.batch_size > 0, "batch_size must be at least 1");
    Ok(cfg)
  }

  pub fn load_config(&self) -> LoadConfig {
    LoadConfig {
      batch_size:   self.batch_size,
      recovery_dir: self.recovery_dir.clone(),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
