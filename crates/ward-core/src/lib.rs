//! Core types and trait definitions for the Ward ingestion pipeline.
//!
//! This crate has no database or CSV dependencies. It holds
//! the typed destination records, the row validator, the rejection taxonomy,
//! and the [`store::Session`] abstraction every storage backend implements.

pub mod error;
pub mod facility;
pub mod reject;
pub mod store;
pub mod table;
pub mod validate;
pub mod value;

pub use error::{Error, Result};
