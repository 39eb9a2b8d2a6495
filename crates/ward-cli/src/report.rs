//! Read-only summaries of what has been loaded.

use std::fmt;

use anyhow::Context as _;
use chrono::NaiveDate;
use serde::Serialize;
use strum::IntoEnumIterator as _;
use ward_core::{
  facility::{Measure, Measures},
  store::Session,
  validate::DATE_FORMAT,
  value::Value,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekCount {
  pub week:    NaiveDate,
  pub records: i64,
}

/// Summed measures across all facilities for one collection week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedTotals {
  pub week:     NaiveDate,
  pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingCount {
  /// `None` for facilities with no rating at all.
  pub rating:     Option<f64>,
  pub facilities: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBreakdown {
  pub rated_on: NaiveDate,
  pub counts:   Vec<RatingCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub weeks:   Vec<WeekCount>,
  pub beds:    Option<BedTotals>,
  pub ratings: Option<RatingBreakdown>,
}

/// Build the report for `week`, or for the most recent loaded week.
pub fn build<S: Session>(
  session: &mut S,
  week: Option<NaiveDate>,
) -> anyhow::Result<Report> {
  let week = match week {
    Some(week) => Some(week),
    None => latest_date(
      session,
      "SELECT MAX(collection_week) FROM bed_capacity_snapshots",
    )?,
  };

  let Some(week) = week else {
    return Ok(Report { weeks: Vec::new(), beds: None, ratings: ratings(session)? });
  };

  Ok(Report {
    weeks:   weeks_through(session, week)?,
    beds:    Some(bed_totals(session, week)?),
    ratings: ratings(session)?,
  })
}

/// Snapshot counts for `week` and every earlier week, newest first.
pub fn weeks_through<S: Session>(
  session: &mut S,
  week: NaiveDate,
) -> anyhow::Result<Vec<WeekCount>> {
  let rows = session.fetch_all(
    "SELECT collection_week, COUNT(*) FROM bed_capacity_snapshots
     WHERE collection_week <= ?
     GROUP BY collection_week
     ORDER BY collection_week DESC",
    &[week.into()],
  )?;

  rows
    .iter()
    .map(|row| {
      Ok(WeekCount {
        week:    parse_date(&row[0])?,
        records: row[1].as_i64()?,
      })
    })
    .collect()
}

pub fn bed_totals<S: Session>(
  session: &mut S,
  week: NaiveDate,
) -> anyhow::Result<BedTotals> {
  let sums = Measure::iter()
    .map(|m| format!("SUM({})", m.column()))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    "SELECT {sums} FROM bed_capacity_snapshots WHERE collection_week = ?"
  );

  let row = session
    .fetch_one(&sql, &[week.into()])?
    .context("aggregate query returned no row")?;
  let mut measures: Measures = Default::default();
  for (slot, value) in measures.iter_mut().zip(&row) {
    *slot = value.as_f64()?;
  }
  Ok(BedTotals { week, measures })
}

/// Facilities per overall rating on the latest rating date.
pub fn ratings<S: Session>(
  session: &mut S,
) -> anyhow::Result<Option<RatingBreakdown>> {
  let Some(rated_on) =
    latest_date(session, "SELECT MAX(rated_on) FROM quality_ratings")?
  else {
    return Ok(None);
  };

  let rows = session.fetch_all(
    "SELECT overall_rating, COUNT(*) FROM quality_ratings
     WHERE rated_on = ?
     GROUP BY overall_rating
     ORDER BY overall_rating",
    &[rated_on.into()],
  )?;
  let counts = rows
    .iter()
    .map(|row| {
      Ok(RatingCount {
        rating:     row[0].as_f64()?,
        facilities: row[1].as_i64()?,
      })
    })
    .collect::<anyhow::Result<_>>()?;

  Ok(Some(RatingBreakdown { rated_on, counts }))
}

fn latest_date<S: Session>(
  session: &mut S,
  sql: &str,
) -> anyhow::Result<Option<NaiveDate>> {
  match session.fetch_one(sql, &[])? {
    Some(row) if !row[0].is_null() => Ok(Some(parse_date(&row[0])?)),
    _ => Ok(None),
  }
}

fn parse_date(value: &Value) -> anyhow::Result<NaiveDate> {
  let text = value.as_text()?;
  NaiveDate::parse_from_str(text, DATE_FORMAT)
    .with_context(|| format!("stored date {text:?} is malformed"))
}

// ─── Text rendering ──────────────────────────────────────────────────────────

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.weeks.is_empty() {
      writeln!(f, "No bed-capacity snapshots loaded.")?;
    } else {
      writeln!(f, "Snapshots per week:")?;
      for w in &self.weeks {
        writeln!(f, "  {}  {:>6}", w.week, w.records)?;
      }
    }

    if let Some(beds) = &self.beds {
      writeln!(f, "Bed totals for {}:", beds.week)?;
      for measure in Measure::iter() {
        let total = Value::from(beds.measures[measure as usize]);
        writeln!(f, "  {:<58} {}", measure.column(), total.display())?;
      }
    }

    match &self.ratings {
      None => write!(f, "No quality ratings loaded."),
      Some(r) => {
        write!(f, "Facilities per overall rating on {}:", r.rated_on)?;
        for c in &r.counts {
          let rating = match c.rating {
            Some(rating) => format!("{rating}"),
            None => "unrated".to_owned(),
          };
          write!(f, "\n  {rating:<8} {:>6}", c.facilities)?;
        }
        Ok(())
      }
    }
  }
}
