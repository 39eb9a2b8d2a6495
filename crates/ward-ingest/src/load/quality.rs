//! CMS hospital quality extracts.
//!
//! Only five columns are read. Every rating in one extract shares the as-of
//! date given on the command line, so duplicates are found with one batched
//! query per chunk rather than a lookup per row.

use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use ward_core::{
  facility::{NaturalKey, QualityRating, RowIndex},
  store::{Session, Transaction},
  table::Table,
  validate::{coerce_flag, coerce_rating, optional_text, require_text},
};

use super::{Draft, Existing, Ledger, Run, load_table};
use crate::{
  config::LoadConfig,
  duplicate,
  extract::{Extract, field},
  summary::{LoadKind, LoadSummary},
  Error, Result,
};

pub const FACILITY_ID: &str = "Facility ID";
pub const OVERALL_RATING: &str = "Hospital overall rating";
pub const EMERGENCY_SERVICES: &str = "Emergency Services";
pub const HOSPITAL_TYPE: &str = "Hospital Type";
pub const OWNERSHIP: &str = "Hospital Ownership";

/// Load one quality extract from `path`, dating every rating `rated_on`.
///
/// Rejected rows are written to `<recovery_dir>/quality.csv`.
pub fn load_quality<S: Session>(
  session: &mut S,
  path: impl AsRef<Path>,
  rated_on: NaiveDate,
  config: &LoadConfig,
) -> Result<LoadSummary> {
  let path = path.as_ref();
  let run = Run::start(LoadKind::Quality, path);
  let span = tracing::info_span!(
    "load",
    kind = %run.kind,
    run_id = %run.id,
    %rated_on
  );
  let _entered = span.enter();

  let extract = Extract::read(path)?;
  let columns = QualityColumns::resolve(&extract)?;
  tracing::info!(rows = extract.len(), source = %path.display(), "extract read");

  let drafts: Vec<Draft<QualityRating>> = extract
    .rows()
    .map(|(index, record)| match record {
      Ok(record) => columns.rating(index, &record, rated_on),
      Err(reason) => Draft::refused(index, reason),
    })
    .collect();
  let facility_ids: Vec<String> = drafts
    .iter()
    .filter_map(|d| d.key.as_ref().ok())
    .map(|key| key.facility_id.clone())
    .collect();

  let mut ledger = Ledger::new(LoadKind::Quality.tables());
  let mut tx = Transaction::begin(session).map_err(Error::store)?;

  let existing = duplicate::existing_on(
    &mut *tx,
    Table::QualityRatings,
    &facility_ids,
    rated_on,
    config.batch_size,
  )?;
  tracing::info!(found = existing.len(), "existing ratings for date");

  load_table(
    &mut tx,
    &mut ledger,
    drafts,
    &Existing::Known(existing),
    |_: &QualityRating| Ok(()),
    config.batch_size,
  )?;

  let staged = run.stage(&extract, &ledger, config)?;
  tx.commit().map_err(Error::store)?;
  run.finish(extract.len(), ledger, staged)
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

struct QualityColumns {
  facility_id:        usize,
  overall_rating:     usize,
  emergency_services: usize,
  hospital_type:      usize,
  ownership:          usize,
}

impl QualityColumns {
  fn resolve(extract: &Extract) -> Result<Self> {
    let [facility_id, overall_rating, emergency_services, hospital_type, ownership] =
      extract.columns([
        FACILITY_ID,
        OVERALL_RATING,
        EMERGENCY_SERVICES,
        HOSPITAL_TYPE,
        OWNERSHIP,
      ])?;
    Ok(Self {
      facility_id,
      overall_rating,
      emergency_services,
      hospital_type,
      ownership,
    })
  }

  fn rating(
    &self,
    index: RowIndex,
    record: &StringRecord,
    rated_on: NaiveDate,
  ) -> Draft<QualityRating> {
    let id = require_text(FACILITY_ID, field(record, self.facility_id));
    Draft {
      index,
      key: id.clone().map(|id| NaturalKey::dated(id, rated_on)),
      record: id.and_then(|facility_id| {
        Ok(QualityRating {
          facility_id,
          rated_on,
          hospital_type: optional_text(field(record, self.hospital_type)),
          ownership: optional_text(field(record, self.ownership)),
          emergency_services: coerce_flag(
            EMERGENCY_SERVICES,
            field(record, self.emergency_services),
          )?,
          overall_rating: coerce_rating(
            OVERALL_RATING,
            field(record, self.overall_rating),
          )?,
        })
      }),
    }
  }
}
