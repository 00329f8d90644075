//! Error types for `strata-store-ndjson`.
//!
//! JSON errors here come from descriptor and index files only — a version
//! log line that fails to parse is the tolerated-skip path in `log`, never a
//! hard error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] strata_core::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed descriptor or index file: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
