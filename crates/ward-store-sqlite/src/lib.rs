//! SQLite backend for the Ward ingestion pipeline.
//!
//! [`SqliteSession`] owns one [`rusqlite::Connection`] and implements
//! [`ward_core::store::Session`] on top of it. Opening a session also applies
//! the schema, so a fresh file is ready to load into.

mod encode;
mod schema;
mod session;

pub mod error;

pub use error::{Error, Result};
pub use schema::SCHEMA;
pub use session::SqliteSession;
