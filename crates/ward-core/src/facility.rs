//! Destination records, one fixed-shape struct per table.
//!
//! Source rows are mapped into these immediately after parsing, so
//! validation and insertion never look fields up by name. Every record is
//! append-only: the pipeline inserts, it never updates or deletes.

use chrono::NaiveDate;
use serde::Serialize;
use strum::{EnumCount, EnumIter, IntoStaticStr};

use crate::{table::Table, value::Value};

/// Stable 0-based position of a data row in its source extract (the header
/// row is not counted). Assigned at parse time and carried to the end.
pub type RowIndex = usize;

// ─── Measures ────────────────────────────────────────────────────────────────

/// The non-negative bed-capacity measures of a weekly snapshot, in
/// validation order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  EnumCount,
  EnumIter,
  IntoStaticStr,
)]
pub enum Measure {
  #[strum(serialize = "all_adult_hospital_beds_7_day_avg")]
  AdultBeds,
  #[strum(serialize = "all_pediatric_inpatient_beds_7_day_avg")]
  PediatricBeds,
  #[strum(serialize = "all_adult_hospital_inpatient_bed_occupied_7_day_coverage")]
  AdultBedsOccupied,
  #[strum(serialize = "all_pediatric_inpatient_bed_occupied_7_day_avg")]
  PediatricBedsOccupied,
  #[strum(serialize = "total_icu_beds_7_day_avg")]
  IcuBeds,
  #[strum(serialize = "icu_beds_used_7_day_avg")]
  IcuBedsUsed,
  #[strum(serialize = "inpatient_beds_used_covid_7_day_avg")]
  CovidInpatientBedsUsed,
  #[strum(serialize = "staffed_icu_adult_patients_confirmed_covid_7_day_avg")]
  CovidIcuAdultPatients,
}

impl Measure {
  /// Column name, identical in the source extract and the destination table.
  pub fn column(self) -> &'static str { self.into() }
}

/// Measure values indexed by `Measure as usize`.
pub type Measures = [Option<f64>; Measure::COUNT];

// ─── Natural keys ────────────────────────────────────────────────────────────

/// The external identifier(s) that distinguish a record in its table: the
/// facility alone, or the facility plus a week / rating date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
  pub facility_id: String,
  pub date:        Option<NaiveDate>,
}

impl NaturalKey {
  pub fn facility(facility_id: impl Into<String>) -> Self {
    Self { facility_id: facility_id.into(), date: None }
  }

  pub fn dated(facility_id: impl Into<String>, date: NaiveDate) -> Self {
    Self { facility_id: facility_id.into(), date: Some(date) }
  }

  /// Parameters matching [`Table::key_columns`].
  pub fn params(&self) -> Vec<Value> {
    let mut params = vec![Value::from(self.facility_id.as_str())];
    if let Some(date) = self.date {
      params.push(date.into());
    }
    params
  }
}

// ─── Record trait ────────────────────────────────────────────────────────────

/// A typed row destined for one table.
pub trait Record {
  const TABLE: Table;

  fn key(&self) -> NaturalKey;

  /// Insert parameters, in [`Table::columns`] order.
  fn params(&self) -> Vec<Value>;
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A reporting facility, created on first sighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facility {
  pub facility_id: String,
  pub name:        Option<String>,
}

impl Record for Facility {
  const TABLE: Table = Table::Facilities;

  fn key(&self) -> NaturalKey { NaturalKey::facility(&self.facility_id) }

  fn params(&self) -> Vec<Value> {
    vec![self.facility_id.as_str().into(), self.name.clone().into()]
  }
}

/// Where a facility is; one-to-one with [`Facility`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityLocation {
  pub facility_id:      String,
  pub state:            Option<String>,
  pub address:          Option<String>,
  pub city:             Option<String>,
  pub zip:              Option<String>,
  pub fips_code:        Option<String>,
  /// `POINT (lon lat)` text as published in the extract.
  pub geocoded_address: Option<String>,
}

impl Record for FacilityLocation {
  const TABLE: Table = Table::FacilityLocations;

  fn key(&self) -> NaturalKey { NaturalKey::facility(&self.facility_id) }

  fn params(&self) -> Vec<Value> {
    vec![
      self.facility_id.as_str().into(),
      self.state.clone().into(),
      self.address.clone().into(),
      self.city.clone().into(),
      self.zip.clone().into(),
      self.fips_code.clone().into(),
      self.geocoded_address.clone().into(),
    ]
  }
}

/// One facility's bed capacity for one collection week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedCapacitySnapshot {
  pub facility_id:     String,
  /// First day of the 7-day collection window.
  pub collection_week: NaiveDate,
  pub measures:        Measures,
}

impl BedCapacitySnapshot {
  pub fn measure(&self, measure: Measure) -> Option<f64> {
    self.measures[measure as usize]
  }
}

impl Record for BedCapacitySnapshot {
  const TABLE: Table = Table::BedCapacitySnapshots;

  fn key(&self) -> NaturalKey {
    NaturalKey::dated(&self.facility_id, self.collection_week)
  }

  fn params(&self) -> Vec<Value> {
    let mut params = Vec::with_capacity(2 + Measure::COUNT);
    params.push(self.facility_id.as_str().into());
    params.push(self.collection_week.into());
    params.extend(self.measures.iter().map(|m| Value::from(*m)));
    params
  }
}

/// A facility's quality rating as published on `rated_on`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityRating {
  pub facility_id:        String,
  pub rated_on:           NaiveDate,
  pub hospital_type:      Option<String>,
  pub ownership:          Option<String>,
  pub emergency_services: Option<bool>,
  pub overall_rating:     Option<f64>,
}

impl Record for QualityRating {
  const TABLE: Table = Table::QualityRatings;

  fn key(&self) -> NaturalKey {
    NaturalKey::dated(&self.facility_id, self.rated_on)
  }

  fn params(&self) -> Vec<Value> {
    vec![
      self.facility_id.as_str().into(),
      self.rated_on.into(),
      self.hospital_type.clone().into(),
      self.ownership.clone().into(),
      self.emergency_services.into(),
      self.overall_rating.into(),
    ]
  }
}
