//! Recovery files: the original rows that failed to load.
//!
//! Rows are sliced out of the untouched [`Extract`] by index, so an operator
//! can fix and resubmit exactly what the source published. The file is
//! staged next to its destination before the run commits and only moved into
//! place afterwards.

use std::{
  collections::BTreeSet,
  fs,
  io,
  path::{Path, PathBuf},
};

use csv::{Terminator, WriterBuilder};
use tempfile::NamedTempFile;
use ward_core::facility::RowIndex;

use crate::{extract::Extract, Error, Result};

/// A fully written recovery file waiting for [`StagedRecovery::persist`].
///
/// Dropping it deletes the staged file.
#[derive(Debug)]
pub struct StagedRecovery {
  file: NamedTempFile,
  path: PathBuf,
  rows: usize,
}

impl StagedRecovery {
  /// Number of records written, header excluded.
  pub fn rows(&self) -> usize { self.rows }

  /// Move the staged file over its destination.
  ///
  /// If the move fails the staged file is kept, so the rows are not lost.
  pub fn persist(self) -> Result<PathBuf> {
    let path = self.path;
    if let Err(e) = self.file.persist(&path) {
      if let Ok((_, kept)) = e.file.keep() {
        tracing::error!(kept = %kept.display(), "recovery rows left in staging file");
      }
      return Err(Error::Recovery { path, source: e.error });
    }
    Ok(path)
  }
}

/// Write the header and every record in `indices`, in original file order,
/// one record per `\r`-terminated line, to a staging file beside `path`.
pub fn stage_recovery(
  path: &Path,
  extract: &Extract,
  indices: &BTreeSet<RowIndex>,
) -> Result<StagedRecovery> {
  let io_err = |source| Error::Recovery { path: path.to_path_buf(), source };

  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  fs::create_dir_all(dir).map_err(io_err)?;
  let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;

  let rows = write_rows(file.as_file_mut(), extract, indices).map_err(io_err)?;
  Ok(StagedRecovery { file, path: path.to_path_buf(), rows })
}

fn write_rows(
  out: impl io::Write,
  extract: &Extract,
  indices: &BTreeSet<RowIndex>,
) -> io::Result<usize> {
  let mut writer = WriterBuilder::new()
    .flexible(true)
    .terminator(Terminator::Any(b'\r'))
    .from_writer(out);
  writer.write_record(extract.headers())?;

  let mut written = 0;
  for record in indices.iter().filter_map(|&i| extract.record(i)) {
    writer.write_byte_record(record)?;
    written += 1;
  }
  writer.flush()?;
  Ok(written)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_selected_rows_in_file_order() {
    let extract = Extract::from_reader(
      "id,name\n0,a\n1,\"b, inc\"\n2,c\n3,d\n".as_bytes(),
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out.csv");

    let staged =
      stage_recovery(&path, &extract, &BTreeSet::from([3, 1])).unwrap();
    assert_eq!(staged.rows(), 2);
    assert!(!path.exists());

    assert_eq!(staged.persist().unwrap(), path);
    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "id,name\r1,\"b, inc\"\r3,d\r");
  }

  #[test]
  fn empty_selection_writes_header_only() {
    let extract = Extract::from_reader("id\n0\n".as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let staged = stage_recovery(&path, &extract, &BTreeSet::new()).unwrap();
    assert_eq!(staged.rows(), 0);
    staged.persist().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "id\r");
  }

  #[test]
  fn undecodable_rows_are_written_back_byte_for_byte() {
    let extract =
      Extract::from_reader(&b"id,name\n1,Alpha\n2,Caf\xe9\n"[..]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    stage_recovery(&path, &extract, &BTreeSet::from([1]))
      .unwrap()
      .persist()
      .unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"id,name\r2,Caf\xe9\r");
  }

  #[test]
  fn dropped_stage_leaves_no_file() {
    let extract = Extract::from_reader("id\n0\n".as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    drop(stage_recovery(&path, &extract, &BTreeSet::from([0])).unwrap());
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
  }

  #[test]
  fn blocked_directory_is_a_recovery_error() {
    let extract = Extract::from_reader("id\n0\n".as_bytes()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let err = stage_recovery(&blocker.join("out.csv"), &extract, &BTreeSet::new())
      .unwrap_err();
    assert!(matches!(err, Error::Recovery { .. }));
  }
}
