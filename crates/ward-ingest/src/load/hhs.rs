//! HHS weekly bed-capacity extracts.
//!
//! One wide source row feeds three narrow tables: `facilities`,
//! `facility_locations` and `bed_capacity_snapshots`. The tables are loaded
//! in that order and independently; a row refused by one table is still
//! offered to the others.

use std::path::Path;

use csv::StringRecord;
use strum::{EnumCount as _, IntoEnumIterator as _};
use ward_core::{
  facility::{
    BedCapacitySnapshot, Facility, FacilityLocation, Measure, Measures,
    NaturalKey, RowIndex,
  },
  reject::Checked,
  store::{Session, Transaction},
  validate::{
    coerce_date, coerce_measure, optional_text, require_text, validate_snapshot,
  },
};

use super::{Draft, Existing, Ledger, Run, load_table};
use crate::{
  config::LoadConfig,
  extract::{Extract, field},
  summary::{LoadKind, LoadSummary},
  Error, Result,
};

/// Identity and location columns, in [`HhsColumns`] order.
pub const HHS_COLUMNS: [&str; 9] = [
  "hospital_pk",
  "hospital_name",
  "state",
  "address",
  "city",
  "zip",
  "fips_code",
  "geocoded_hospital_address",
  "collection_week",
];

/// Load one HHS extract from `path` through `session`.
///
/// Duplicates, invalid rows and rows the store refuses are counted and
/// written to `<recovery_dir>/hhs.csv`. Any other error rolls the whole run
/// back and is returned.
pub fn load_hhs<S: Session>(
  session: &mut S,
  path: impl AsRef<Path>,
  config: &LoadConfig,
) -> Result<LoadSummary> {
  let path = path.as_ref();
  let run = Run::start(LoadKind::Hhs, path);
  let span = tracing::info_span!("load", kind = %run.kind, run_id = %run.id);
  let _entered = span.enter();

  let extract = Extract::read(path)?;
  let columns = HhsColumns::resolve(&extract)?;
  tracing::info!(rows = extract.len(), source = %path.display(), "extract read");

  let mut facilities = Vec::with_capacity(extract.len());
  let mut locations = Vec::with_capacity(extract.len());
  let mut snapshots = Vec::with_capacity(extract.len());
  for (index, record) in extract.rows() {
    match record {
      Ok(record) => {
        facilities.push(columns.facility(index, &record));
        locations.push(columns.location(index, &record));
        snapshots.push(columns.snapshot(index, &record));
      }
      Err(reason) => {
        facilities.push(Draft::refused(index, reason.clone()));
        locations.push(Draft::refused(index, reason.clone()));
        snapshots.push(Draft::refused(index, reason));
      }
    }
  }

  let mut ledger = Ledger::new(LoadKind::Hhs.tables());
  let batch_size = config.batch_size;
  let mut tx = Transaction::begin(session).map_err(Error::store)?;

  load_table(&mut tx, &mut ledger, facilities, &Existing::Lookup, accept, batch_size)?;
  load_table(&mut tx, &mut ledger, locations, &Existing::Lookup, accept, batch_size)?;
  load_table(
    &mut tx,
    &mut ledger,
    snapshots,
    &Existing::Lookup,
    validate_snapshot,
    batch_size,
  )?;

  let staged = run.stage(&extract, &ledger, config)?;
  tx.commit().map_err(Error::store)?;
  run.finish(extract.len(), ledger, staged)
}

fn accept<T>(_: &T) -> Checked<()> { Ok(()) }

// ─── Row mapping ─────────────────────────────────────────────────────────────

/// Column positions of one extract's header.
struct HhsColumns {
  facility_id:      usize,
  name:             usize,
  state:            usize,
  address:          usize,
  city:             usize,
  zip:              usize,
  fips_code:        usize,
  geocoded_address: usize,
  collection_week:  usize,
  measures:         [usize; Measure::COUNT],
}

impl HhsColumns {
  fn resolve(extract: &Extract) -> Result<Self> {
    let [
      facility_id,
      name,
      state,
      address,
      city,
      zip,
      fips_code,
      geocoded_address,
      collection_week,
    ] = extract.columns(HHS_COLUMNS)?;

    let mut measures = [0; Measure::COUNT];
    for measure in Measure::iter() {
      measures[measure as usize] = extract.column(measure.column())?;
    }

    Ok(Self {
      facility_id,
      name,
      state,
      address,
      city,
      zip,
      fips_code,
      geocoded_address,
      collection_week,
      measures,
    })
  }

  fn facility_id(&self, record: &StringRecord) -> Checked<String> {
    require_text(HHS_COLUMNS[0], field(record, self.facility_id))
  }

  fn facility(&self, index: RowIndex, record: &StringRecord) -> Draft<Facility> {
    let id = self.facility_id(record);
    Draft {
      index,
      key: id.clone().map(NaturalKey::facility),
      record: id.map(|facility_id| Facility {
        facility_id,
        name: optional_text(field(record, self.name)),
      }),
    }
  }

  fn location(
    &self,
    index: RowIndex,
    record: &StringRecord,
  ) -> Draft<FacilityLocation> {
    let id = self.facility_id(record);
    let text = |column| optional_text(field(record, column));
    Draft {
      index,
      key: id.clone().map(NaturalKey::facility),
      record: id.map(|facility_id| FacilityLocation {
        facility_id,
        state: text(self.state),
        address: text(self.address),
        city: text(self.city),
        zip: text(self.zip),
        fips_code: text(self.fips_code),
        geocoded_address: text(self.geocoded_address),
      }),
    }
  }

  fn snapshot(
    &self,
    index: RowIndex,
    record: &StringRecord,
  ) -> Draft<BedCapacitySnapshot> {
    let ident = self.facility_id(record).and_then(|id| {
      let week = coerce_date(HHS_COLUMNS[8], field(record, self.collection_week))?;
      Ok((id, week))
    });

    Draft {
      index,
      key: ident.clone().map(|(id, week)| NaturalKey::dated(id, week)),
      record: ident.and_then(|(facility_id, collection_week)| {
        Ok(BedCapacitySnapshot {
          facility_id,
          collection_week,
          measures: self.measures(record)?,
        })
      }),
    }
  }

  fn measures(&self, record: &StringRecord) -> Checked<Measures> {
    let mut values: Measures = [None; Measure::COUNT];
    for measure in Measure::iter() {
      let raw = field(record, self.measures[measure as usize]);
      values[measure as usize] = coerce_measure(measure.column(), raw)?;
    }
    Ok(values)
  }
}
