use std::fs;

use chrono::NaiveDate;
use clap::Parser;
use ward_core::{facility::Measure, store::Session, table::Table, value::Value};
use ward_store_sqlite::SqliteSession;

use crate::{Cli, Command, report, settings::WardConfig};

fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

// ─── Arguments ───────────────────────────────────────────────────────────────

#[test]
fn parses_load_quality_with_global_flags_after_subcommand() {
  let cli = Cli::try_parse_from([
    "ward",
    "load-quality",
    "2023-01-15",
    "quality.csv",
    "--json",
  ])
  .unwrap();

  assert!(cli.json);
  assert_eq!(cli.config.to_str(), Some("ward.toml"));
  let Command::LoadQuality { date: d, csv } = cli.command else {
    panic!("wrong subcommand");
  };
  assert_eq!(d, date("2023-01-15"));
  assert_eq!(csv.to_str(), Some("quality.csv"));
}

#[test]
fn wrong_argument_count_is_a_usage_error() {
  assert!(Cli::try_parse_from(["ward", "load-hhs"]).is_err());
  assert!(Cli::try_parse_from(["ward", "load-quality", "q.csv"]).is_err());
  assert!(Cli::try_parse_from(["ward", "load-quality", "15/01/2023", "q.csv"]).is_err());
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[test]
fn missing_config_file_falls_back_to_defaults() {
  let dir = tempfile::tempdir().unwrap();
  let cfg = WardConfig::load(&dir.path().join("absent.toml")).unwrap();
  assert_eq!(cfg, WardConfig::default());
  assert_eq!(cfg.batch_size, 500);
  assert_eq!(cfg.store_path.to_str(), Some("ward.db"));
}

#[test]
fn config_file_overrides_defaults() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ward.toml");
  fs::write(&path, "store_path = \"/srv/ward.db\"\nbatch_size = 50\n").unwrap();

  let cfg = WardConfig::load(&path).unwrap();
  assert_eq!(cfg.store_path.to_str(), Some("/srv/ward.db"));
  assert_eq!(cfg.load_config().batch_size, 50);
  assert_eq!(cfg.recovery_dir.to_str(), Some("invalid_data"));
}

#[test]
fn zero_batch_size_is_refused() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ward.toml");
  fs::write(&path, "batch_size = 0\n").unwrap();
  assert!(WardConfig::load(&path).is_err());
}

// ─── Report ──────────────────────────────────────────────────────────────────

fn insert(session: &mut SqliteSession, table: Table, params: Vec<Value>) {
  session.execute(&table.insert_sql(), &params).unwrap();
}

fn snapshot(id: &str, week: &str, adult_beds: f64) -> Vec<Value> {
  let mut params = vec![id.into(), date(week).into(), adult_beds.into()];
  params.extend((1..8).map(|_| Value::Null));
  params
}

fn rating(id: &str, on: &str, overall: Option<f64>) -> Vec<Value> {
  vec![
    id.into(),
    date(on).into(),
    Value::Null,
    Value::Null,
    Value::Null,
    overall.into(),
  ]
}

fn seeded() -> SqliteSession {
  let mut s = SqliteSession::open_in_memory().unwrap();
  for id in ["A", "B", "C"] {
    insert(&mut s, Table::Facilities, vec![id.into(), Value::Null]);
  }
  insert(&mut s, Table::BedCapacitySnapshots, snapshot("A", "2022-09-16", 10.0));
  insert(&mut s, Table::BedCapacitySnapshots, snapshot("A", "2022-09-23", 12.0));
  insert(&mut s, Table::BedCapacitySnapshots, snapshot("B", "2022-09-23", 30.5));
  insert(&mut s, Table::BedCapacitySnapshots, snapshot("C", "2022-09-30", 1.0));

  insert(&mut s, Table::QualityRatings, rating("A", "2022-12-01", Some(2.0)));
  insert(&mut s, Table::QualityRatings, rating("A", "2023-01-15", Some(4.0)));
  insert(&mut s, Table::QualityRatings, rating("B", "2023-01-15", Some(4.0)));
  insert(&mut s, Table::QualityRatings, rating("C", "2023-01-15", None));
  s
}

#[test]
fn report_for_a_week_counts_it_and_earlier_weeks() {
  let mut session = seeded();
  let report = report::build(&mut session, Some(date("2022-09-23"))).unwrap();

  let weeks: Vec<(NaiveDate, i64)> =
    report.weeks.iter().map(|w| (w.week, w.records)).collect();
  assert_eq!(weeks, vec![(date("2022-09-23"), 2), (date("2022-09-16"), 1)]);

  let beds = report.beds.unwrap();
  assert_eq!(beds.measures[Measure::AdultBeds as usize], Some(42.5));
  assert_eq!(beds.measures[Measure::IcuBeds as usize], None);
}

#[test]
fn report_defaults_to_latest_week() {
  let mut session = seeded();
  let report = report::build(&mut session, None).unwrap();
  assert_eq!(report.weeks.len(), 3);
  assert_eq!(report.beds.unwrap().week, date("2022-09-30"));
}

#[test]
fn ratings_use_latest_date_only() {
  let mut session = seeded();
  let breakdown = report::ratings(&mut session).unwrap().unwrap();

  assert_eq!(breakdown.rated_on, date("2023-01-15"));
  let counts: Vec<(Option<f64>, i64)> =
    breakdown.counts.iter().map(|c| (c.rating, c.facilities)).collect();
  assert_eq!(counts, vec![(None, 1), (Some(4.0), 2)]);
}

#[test]
fn empty_store_reports_nothing() {
  let mut session = SqliteSession::open_in_memory().unwrap();
  let report = report::build(&mut session, None).unwrap();

  assert!(report.weeks.is_empty());
  assert!(report.beds.is_none());
  assert!(report.ratings.is_none());
  assert!(report.to_string().contains("No quality ratings loaded."));
}
