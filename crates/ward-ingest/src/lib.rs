//! Batch ingestion of HHS bed-capacity and CMS quality extracts.
//!
//! Works against any [`ward_core::store::Session`]. A load reads the whole
//! extract, maps each row into typed per-table records, rejects duplicates
//! and invalid rows, inserts the rest in batches with a per-row fallback,
//! and writes every rejected source row to a recovery CSV.
//!
//! ```no_run
//! use ward_ingest::{LoadConfig, load_hhs};
//! use ward_store_sqlite::SqliteSession;
//!
//! let mut session = SqliteSession::open("ward.db").unwrap();
//! let summary = load_hhs(&mut session, "week.csv", &LoadConfig::default()).unwrap();
//! println!("{summary}");
//! ```

pub mod commit;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod extract;
pub mod load;
pub mod recovery;
pub mod summary;

pub use config::LoadConfig;
pub use error::{Error, Result};
pub use load::{hhs::load_hhs, quality::load_quality};
pub use summary::{LoadKind, LoadSummary, TableCounts};
