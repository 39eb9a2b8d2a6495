//! Reading a source extract.
//!
//! The raw records are kept exactly as parsed, bytes and all. Normalization
//! decodes a copy of each row and never modifies the originals, so the
//! recovery writer can hand operators the original rows back.

use std::{io::Read, path::Path};

use csv::{ByteRecord, ReaderBuilder, StringRecord};
use ward_core::{
  facility::RowIndex,
  reject::{Checked, Reason},
};

use crate::{Error, Result};

/// A fully-read CSV extract: header plus every data record, in file order.
#[derive(Debug, Clone)]
pub struct Extract {
  headers: StringRecord,
  records: Vec<ByteRecord>,
}

impl Extract {
  pub fn read(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let reader = builder()
      .from_path(path)
      .map_err(|source| Error::Extract { path: path.to_path_buf(), source })?;
    Self::collect(reader).map_err(|source| Error::Extract {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn from_reader(input: impl Read) -> Result<Self> {
    Ok(Self::collect(builder().from_reader(input))?)
  }

  fn collect<R: Read>(mut reader: csv::Reader<R>) -> csv::Result<Self> {
    let headers = reader.headers()?.clone();
    let records = reader.byte_records().collect::<csv::Result<Vec<_>>>()?;
    Ok(Self { headers, records })
  }

  pub fn headers(&self) -> &StringRecord { &self.headers }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// The untouched record at `index`.
  pub fn record(&self, index: RowIndex) -> Option<&ByteRecord> {
    self.records.get(index)
  }

  /// Data records decoded as UTF-8, paired with their stable row index.
  ///
  /// A row that does not decode is an invalid row naming the first bad field;
  /// its neighbours are unaffected.
  pub fn rows(&self) -> impl Iterator<Item = (RowIndex, Checked<StringRecord>)> {
    self
      .records
      .iter()
      .enumerate()
      .map(|(index, raw)| (index, self.decode(raw)))
  }

  fn decode(&self, raw: &ByteRecord) -> Checked<StringRecord> {
    StringRecord::from_byte_record(raw.clone()).map_err(|e| {
      let err = e.utf8_error();
      let field = self.headers.get(err.field()).unwrap_or("?");
      Reason::invalid(
        field,
        format!("invalid UTF-8 after byte {}", err.valid_up_to()),
      )
    })
  }

  /// Position of the column named `name`.
  pub fn column(&self, name: &str) -> Result<usize> {
    self
      .headers
      .iter()
      .position(|h| h.trim() == name)
      .ok_or_else(|| Error::MissingColumn(name.to_owned()))
  }

  /// Positions of several columns at once; fails on the first missing one.
  pub fn columns<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N]> {
    let mut positions = [0; N];
    for (slot, name) in positions.iter_mut().zip(names) {
      *slot = self.column(name)?;
    }
    Ok(positions)
  }
}

/// Field `column` of `record`; missing trailing fields of a short row read as
/// empty.
pub fn field(record: &StringRecord, column: usize) -> &str {
  record.get(column).unwrap_or("")
}

fn builder() -> ReaderBuilder {
  let mut builder = ReaderBuilder::new();
  builder.flexible(true);
  builder
}

#[cfg(test)]
mod tests {
  use super::*;

  const CSV: &str = "id,name,rating\n1,Alpha,3\n2,Beta\n";

  #[test]
  fn keeps_rows_in_order_with_indices() {
    let extract = Extract::from_reader(CSV.as_bytes()).unwrap();
    assert_eq!(extract.len(), 2);

    let ids: Vec<(RowIndex, String)> = extract
      .rows()
      .map(|(i, r)| (i, field(&r.unwrap(), 0).to_owned()))
      .collect();
    assert_eq!(ids, vec![(0, "1".to_owned()), (1, "2".to_owned())]);
  }

  #[test]
  fn short_rows_read_missing_fields_as_empty() {
    let extract = Extract::from_reader(CSV.as_bytes()).unwrap();
    let rating = extract.column("rating").unwrap();
    let (_, row) = extract.rows().nth(1).unwrap();
    assert_eq!(field(&row.unwrap(), rating), "");
  }

  #[test]
  fn resolves_columns_by_name() {
    let extract = Extract::from_reader(CSV.as_bytes()).unwrap();
    assert_eq!(extract.columns(["rating", "id"]).unwrap(), [2, 0]);

    let err = extract.columns(["id", "missing"]).unwrap_err();
    assert!(matches!(err, Error::MissingColumn(name) if name == "missing"));
  }

  #[test]
  fn undecodable_row_is_invalid_and_kept_raw() {
    let input = b"id,name\n1,Alpha\n2,Caf\xe9\n3,Gamma\n";
    let extract = Extract::from_reader(&input[..]).unwrap();
    assert_eq!(extract.len(), 3);

    let decoded: Vec<Checked<StringRecord>> =
      extract.rows().map(|(_, r)| r).collect();
    assert!(decoded[0].is_ok());
    assert!(decoded[2].is_ok());
    assert!(matches!(
      &decoded[1],
      Err(Reason::Invalid { field, .. }) if field == "name"
    ));
    assert_eq!(extract.record(1).unwrap().get(1), Some(&b"Caf\xe9"[..]));
  }
}
