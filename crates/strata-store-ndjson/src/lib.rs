//! NDJSON file backend for the Strata record store.
//!
//! Each table lives in a data directory as a schema descriptor
//! (`<table>.schema.json`), an append-only version log (`<table>.ndjson`,
//! one JSON object per line), and zero or more per-column index files
//! (`<table>.<column>.idx.json`). The log is the only source of truth;
//! indexes are derived caches that may be dropped and rebuilt at any time.

mod index;
mod log;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::NdjsonStore;
