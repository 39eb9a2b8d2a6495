//! Row validation and field coercion.
//!
//! Everything here is pure: given the same input, the same verdict. A
//! coercion failure is a [`Reason::Invalid`] naming the offending field.

use chrono::NaiveDate;
use strum::IntoEnumIterator as _;

use crate::{
  facility::{BedCapacitySnapshot, Measure},
  reject::{Checked, Reason},
};

/// Value HHS publishes in place of a suppressed small count.
pub const SUPPRESSED: f64 = -999_999.0;

/// Rating marker CMS publishes for facilities without an overall rating.
pub const RATING_NOT_AVAILABLE: &str = "Not Available";

/// Stored rating for [`RATING_NOT_AVAILABLE`].
pub const RATING_NOT_AVAILABLE_VALUE: f64 = 0.0;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Snapshot rule ───────────────────────────────────────────────────────────

/// Reject the snapshot if any present measure is negative.
///
/// Measures are compared as integers after truncation toward zero, so a
/// fractional average such as `-0.4` passes. Stops at the first violation in
/// [`Measure`] order. Absent measures always pass.
pub fn validate_snapshot(snapshot: &BedCapacitySnapshot) -> Checked<()> {
  for measure in Measure::iter() {
    if let Some(value) = snapshot.measure(measure)
      && (value as i64) < 0
    {
      return Err(Reason::invalid(
        measure.column(),
        format!("{value} is negative"),
      ));
    }
  }
  Ok(())
}

// ─── Coercions ───────────────────────────────────────────────────────────────

/// Empty text is absent.
pub fn optional_text(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// A field that must be present, e.g. the facility identifier.
pub fn require_text(field: &str, raw: &str) -> Checked<String> {
  optional_text(raw).ok_or_else(|| Reason::invalid(field, "missing value"))
}

/// A bed-capacity measure: empty or suppressed is absent, anything else must
/// be a finite number.
pub fn coerce_measure(field: &str, raw: &str) -> Checked<Option<f64>> {
  let Some(value) = parse_number(field, raw)? else {
    return Ok(None);
  };
  Ok((value != SUPPRESSED).then_some(value))
}

/// The overall rating: empty is absent, [`RATING_NOT_AVAILABLE`] maps to
/// [`RATING_NOT_AVAILABLE_VALUE`], anything else must be a number.
pub fn coerce_rating(field: &str, raw: &str) -> Checked<Option<f64>> {
  if raw.trim() == RATING_NOT_AVAILABLE {
    return Ok(Some(RATING_NOT_AVAILABLE_VALUE));
  }
  parse_number(field, raw)
}

/// A `Yes`/`No` flag; empty is absent.
pub fn coerce_flag(field: &str, raw: &str) -> Checked<Option<bool>> {
  match raw.trim() {
    "" => Ok(None),
    "Yes" => Ok(Some(true)),
    "No" => Ok(Some(false)),
    other => Err(Reason::invalid(field, format!("{other:?} is not Yes/No"))),
  }
}

pub fn coerce_date(field: &str, raw: &str) -> Checked<NaiveDate> {
  let trimmed = raw.trim();
  NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
    Reason::invalid(field, format!("{trimmed:?} is not a YYYY-MM-DD date: {e}"))
  })
}

fn parse_number(field: &str, raw: &str) -> Checked<Option<f64>> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }
  match trimmed.parse::<f64>() {
    Ok(value) if value.is_finite() => Ok(Some(value)),
    _ => Err(Reason::invalid(field, format!("{trimmed:?} is not a number"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::facility::Measures;

  fn snapshot(measures: Measures) -> BedCapacitySnapshot {
    BedCapacitySnapshot {
      facility_id: "010001".into(),
      collection_week: NaiveDate::from_ymd_opt(2022, 9, 23).unwrap(),
      measures,
    }
  }

  #[test]
  fn accepts_absent_and_non_negative_measures() {
    let mut measures = [None; 8];
    measures[0] = Some(0.0);
    measures[4] = Some(41.5);
    assert_eq!(validate_snapshot(&snapshot(measures)), Ok(()));
  }

  #[test]
  fn every_measure_is_checked() {
    for measure in Measure::iter() {
      let mut measures = [Some(1.0); 8];
      measures[measure as usize] = Some(-5.0);

      let Err(Reason::Invalid { field, .. }) =
        validate_snapshot(&snapshot(measures))
      else {
        panic!("{measure:?} not rejected");
      };
      assert_eq!(field, measure.column());
    }
  }

  #[test]
  fn first_violation_wins() {
    let mut measures = [None; 8];
    measures[Measure::IcuBedsUsed as usize] = Some(-1.0);
    measures[Measure::PediatricBeds as usize] = Some(-2.0);

    let err = validate_snapshot(&snapshot(measures)).unwrap_err();
    assert_eq!(
      err,
      Reason::invalid("all_pediatric_inpatient_beds_7_day_avg", "-2 is negative")
    );
  }

  #[test]
  fn fractional_negatives_truncate_to_zero() {
    let mut measures = [None; 8];
    measures[0] = Some(-0.4);
    assert_eq!(validate_snapshot(&snapshot(measures)), Ok(()));
  }

  #[test]
  fn measure_coercion() {
    assert_eq!(coerce_measure("m", ""), Ok(None));
    assert_eq!(coerce_measure("m", "  "), Ok(None));
    assert_eq!(coerce_measure("m", "-999999"), Ok(None));
    assert_eq!(coerce_measure("m", "-999999.0"), Ok(None));
    assert_eq!(coerce_measure("m", "12.5"), Ok(Some(12.5)));
    assert_eq!(coerce_measure("m", "-5"), Ok(Some(-5.0)));
    assert!(matches!(
      coerce_measure("m", "NaN"),
      Err(Reason::Invalid { field, .. }) if field == "m"
    ));
    assert!(coerce_measure("m", "twelve").is_err());
  }

  #[test]
  fn rating_coercion() {
    assert_eq!(coerce_rating("r", "Not Available"), Ok(Some(0.0)));
    assert_eq!(coerce_rating("r", ""), Ok(None));
    assert_eq!(coerce_rating("r", "4"), Ok(Some(4.0)));
    assert!(coerce_rating("r", "four stars").is_err());
  }

  #[test]
  fn flag_and_text_coercion() {
    assert_eq!(coerce_flag("e", "Yes"), Ok(Some(true)));
    assert_eq!(coerce_flag("e", "No"), Ok(Some(false)));
    assert_eq!(coerce_flag("e", ""), Ok(None));
    assert!(coerce_flag("e", "Maybe").is_err());

    assert_eq!(optional_text("  Acme  "), Some("Acme".into()));
    assert_eq!(optional_text(""), None);
    assert!(require_text("facility_id", " ").is_err());
  }

  #[test]
  fn date_coercion() {
    assert_eq!(
      coerce_date("d", "2022-09-23"),
      Ok(NaiveDate::from_ymd_opt(2022, 9, 23).unwrap())
    );
    assert!(coerce_date("d", "09/23/2022").is_err());
    assert!(coerce_date("d", "").is_err());
  }
}
