//! `ward`: load public hospital extracts into a SQLite store.
//!
//! # Usage
//!
//! ```text
//! ward load-hhs data/hhs_2022-09-23.csv
//! ward load-quality 2023-01-15 data/quality.csv
//! ward report --week 2022-09-23
//! ward --config ~/.config/ward/ward.toml --json load-hhs week.csv
//! ```
//!
//! Settings come from `ward.toml` (or `--config`) overlaid with `WARD_*`
//! environment variables; see [`settings::WardConfig`].

mod report;
mod settings;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use settings::WardConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use ward_ingest::LoadSummary;
use ward_store_sqlite::SqliteSession;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hospital capacity and quality loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "ward.toml", global = true)]
  config: PathBuf,

  /// Print summaries as JSON instead of text.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load a weekly HHS bed-capacity extract.
  LoadHhs {
    /// The extract CSV.
    csv: PathBuf,
  },

  /// Load a CMS quality extract, dating every rating DATE.
  LoadQuality {
    /// As-of date of the extract (YYYY-MM-DD).
    date: NaiveDate,
    /// The extract CSV.
    csv:  PathBuf,
  },

  /// Summarise what the store holds.
  Report {
    /// Collection week to report on; defaults to the latest loaded.
    #[arg(long)]
    week: Option<NaiveDate>,
  },
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{e:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> anyhow::Result<()> {
  let cfg = WardConfig::load(&cli.config)?;
  let load_cfg = cfg.load_config();

  let mut session = SqliteSession::open(&cfg.store_path)
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  tracing::debug!(store = %cfg.store_path.display(), "store opened");

  match cli.command {
    Command::LoadHhs { csv } => {
      let summary = ward_ingest::load_hhs(&mut session, &csv, &load_cfg)
        .with_context(|| format!("HHS load of {} failed", csv.display()))?;
      print_summary(&summary, cli.json)
    }
    Command::LoadQuality { date, csv } => {
      let summary = ward_ingest::load_quality(&mut session, &csv, date, &load_cfg)
        .with_context(|| format!("quality load of {} failed", csv.display()))?;
      print_summary(&summary, cli.json)
    }
    Command::Report { week } => {
      let report = report::build(&mut session, week)?;
      if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else {
        println!("{report}");
      }
      Ok(())
    }
  }
}

fn print_summary(summary: &LoadSummary, json: bool) -> anyhow::Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(summary)?);
  } else {
    println!("{summary}");
  }
  Ok(())
}

#[cfg(test)]
mod tests;
