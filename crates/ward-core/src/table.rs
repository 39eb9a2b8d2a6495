//! The closed set of destination tables.
//!
//! Table and column names are only ever taken from here, so every identifier
//! that is interpolated into SQL is a compile-time constant.

use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

/// A destination table populated by the loaders.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Display,
  EnumIter,
  IntoStaticStr,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Table {
  Facilities,
  FacilityLocations,
  BedCapacitySnapshots,
  QualityRatings,
}

impl Table {
  /// SQL table name.
  pub fn name(self) -> &'static str { self.into() }

  /// Natural-key columns, in key order.
  pub fn key_columns(self) -> &'static [&'static str] {
    match self {
      Self::Facilities | Self::FacilityLocations => &["facility_id"],
      Self::BedCapacitySnapshots => &["facility_id", "collection_week"],
      Self::QualityRatings => &["facility_id", "rated_on"],
    }
  }

  /// Insertable columns, in the order records produce their parameters.
  pub fn columns(self) -> &'static [&'static str] {
    match self {
      Self::Facilities => &["facility_id", "facility_name"],
      Self::FacilityLocations => &[
        "facility_id",
        "state",
        "address",
        "city",
        "zip",
        "fips_code",
        "geocoded_address",
      ],
      Self::BedCapacitySnapshots => &[
        "facility_id",
        "collection_week",
        "all_adult_hospital_beds_7_day_avg",
        "all_pediatric_inpatient_beds_7_day_avg",
        "all_adult_hospital_inpatient_bed_occupied_7_day_coverage",
        "all_pediatric_inpatient_bed_occupied_7_day_avg",
        "total_icu_beds_7_day_avg",
        "icu_beds_used_7_day_avg",
        "inpatient_beds_used_covid_7_day_avg",
        "staffed_icu_adult_patients_confirmed_covid_7_day_avg",
      ],
      Self::QualityRatings => &[
        "facility_id",
        "rated_on",
        "hospital_type",
        "ownership",
        "emergency_services",
        "overall_rating",
      ],
    }
  }

  /// `INSERT INTO <table> (<columns>) VALUES (?, …)`.
  pub fn insert_sql(self) -> String {
    let columns = self.columns();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
      "INSERT INTO {} ({}) VALUES ({placeholders})",
      self.name(),
      columns.join(", "),
    )
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;
  use crate::facility::Measure;

  #[test]
  fn insert_sql_has_one_placeholder_per_column() {
    let sql = Table::Facilities.insert_sql();
    assert_eq!(
      sql,
      "INSERT INTO facilities (facility_id, facility_name) VALUES (?, ?)"
    );
    for table in Table::iter() {
      let sql = table.insert_sql();
      assert_eq!(sql.matches('?').count(), table.columns().len());
    }
  }

  #[test]
  fn snapshot_columns_follow_measure_order() {
    let tail = &Table::BedCapacitySnapshots.columns()[2..];
    let measures: Vec<&str> = Measure::iter().map(Measure::column).collect();
    assert_eq!(tail, measures.as_slice());
  }

  #[test]
  fn key_columns_are_insertable() {
    for table in Table::iter() {
      for key in table.key_columns() {
        assert!(table.columns().contains(key), "{table}: {key}");
      }
    }
  }
}
