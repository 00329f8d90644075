//! The append-only version log — one JSON object per line.
//!
//! Positions are physical 0-based line numbers, stable once written; index
//! files point at them. Reading tolerates damage instead of failing the
//! whole scan: a malformed interior line is skipped with a warning
//! (surfaced corruption), a malformed or truncated final line is skipped
//! silently (a torn write is "not yet committed").

use std::{
  collections::BTreeMap,
  fs::{self, OpenOptions},
  io::Write as _,
  path::PathBuf,
};

use strata_core::{
  record::{LogPosition, VersionRecord},
  value::Value,
};

use crate::Result;

/// Parse one log line. An explicit JSON `null` field reads as absent — the
/// write path always omits unset keys, but logs written by earlier tooling
/// carry nulls.
fn parse_line(line: &str) -> serde_json::Result<VersionRecord> {
  let raw: BTreeMap<String, Option<Value>> = serde_json::from_str(line)?;
  Ok(VersionRecord::new(
    raw
      .into_iter()
      .filter_map(|(name, value)| value.map(|v| (name, v)))
      .collect(),
  ))
}

pub struct LogFile {
  path: PathBuf,
}

impl LogFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// Touch the log into existence without writing anything.
  pub fn create(&self) -> Result<()> {
    OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?;
    Ok(())
  }

  /// Append one record as a single NDJSON line and return its position.
  ///
  /// If the file currently ends mid-line (a torn write), a newline is
  /// emitted first so the new record starts on a fresh line; the torn line
  /// then reads as a malformed interior line and is skipped on scan.
  pub fn append(&self, record: &VersionRecord) -> Result<LogPosition> {
    let existing = match fs::read_to_string(&self.path) {
      Ok(s) => s,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
      Err(e) => return Err(e.into()),
    };
    let torn_tail = !existing.is_empty() && !existing.ends_with('\n');
    let position = existing.lines().count();

    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?;
    if torn_tail {
      file.write_all(b"\n")?;
    }
    file.write_all(line.as_bytes())?;
    Ok(position)
  }

  /// Scan the whole log in append order, pairing each well-formed record
  /// with its physical line number. Blank lines are skipped; damaged lines
  /// follow the tolerance policy in the module docs.
  pub fn scan(&self) -> Result<Vec<(LogPosition, VersionRecord)>> {
    let content = match fs::read_to_string(&self.path) {
      Ok(s) => s,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };

    let lines: Vec<&str> = content.lines().collect();
    let last_populated = lines.iter().rposition(|l| !l.trim().is_empty());

    let mut out = Vec::new();
    for (position, line) in lines.iter().enumerate() {
      if line.trim().is_empty() {
        continue;
      }
      match parse_line(line) {
        Ok(record) => out.push((position, record)),
        Err(err) => {
          if Some(position) == last_populated {
            // Torn trailing write: not yet committed.
            continue;
          }
          tracing::warn!(
            log = %self.path.display(),
            position,
            %err,
            "skipping malformed version record"
          );
        }
      }
    }
    Ok(out)
  }
}
