//! Per-column exact-match index files.
//!
//! An index maps the compact-JSON form of a column value (absent fields
//! under `"null"`) to the ordered list of log positions whose version record
//! carries that value. Indexes are keyed on raw version-record values, not
//! resolved state, so the query engine treats a lookup as a candidate
//! filter: hits still get fully resolved and re-checked. A missing or
//! unreadable index file means "no index" — a fallback, never an error.

use std::{collections::BTreeMap, fs, path::PathBuf};

use strata_core::{
  record::{LogPosition, VersionRecord},
  value::Value,
};

use crate::Result;

/// Stringified value → ordered log positions.
pub type IndexMap = BTreeMap<String, Vec<LogPosition>>;

/// The lookup key for a (possibly absent) column value.
pub fn key_for(value: Option<&Value>) -> String {
  match value {
    // Compact JSON so `Text("1")` ("\"1\"") and `Int(1)` ("1") stay distinct.
    Some(v) => serde_json::to_string(v).unwrap_or_else(|_| "null".to_owned()),
    None => "null".to_owned(),
  }
}

/// Build an index over `column` from a full log scan of raw version records.
pub fn build(log: &[(LogPosition, VersionRecord)], column: &str) -> IndexMap {
  let mut map = IndexMap::new();
  for (position, record) in log {
    map
      .entry(key_for(record.get(column)))
      .or_default()
      .push(*position);
  }
  map
}

pub struct IndexFile {
  path: PathBuf,
}

impl IndexFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn exists(&self) -> bool { self.path.exists() }

  /// Load the index, or `None` when the file is missing or unreadable —
  /// callers fall back to a full scan either way.
  pub fn load(&self) -> Option<IndexMap> {
    let content = fs::read_to_string(&self.path).ok()?;
    serde_json::from_str(&content).ok()
  }

  pub fn save(&self, map: &IndexMap) -> Result<()> {
    fs::write(&self.path, serde_json::to_string(map)?)?;
    Ok(())
  }

  /// Record a fresh append into the index, keeping positions ordered
  /// (appends arrive in position order).
  pub fn record_append(
    &self,
    column: &str,
    record: &VersionRecord,
    position: LogPosition,
  ) -> Result<()> {
    let Some(mut map) = self.load() else {
      // Unreadable index: leave it alone, scans ignore it anyway.
      return Ok(());
    };
    map
      .entry(key_for(record.get(column)))
      .or_default()
      .push(position);
    self.save(&map)
  }

  /// Remove the index file; dropping a non-existent index is a no-op.
  pub fn delete(&self) -> Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}
