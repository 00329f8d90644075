//! Version records and resolved records — the units the log stores and the
//! merge resolver produces.
//!
//! A version record is one immutable log entry: a map of the fields it sets.
//! Absent fields are simply missing keys, meaning "no change from the prior
//! version of the same identity". A resolved record is the merged,
//! point-in-time state of one identity.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A field map; keys absent from the map are absent from the record.
pub type Fields = std::collections::BTreeMap<String, Value>;

/// 0-based line number of a version record within its table's log; stable
/// once written, and the unit index files point at.
pub type LogPosition = usize;

// ─── VersionRecord ───────────────────────────────────────────────────────────

/// One immutable entry in a table's version log. Serialises as a plain JSON
/// object containing only the present fields.
///
/// Invariant: `id` is always present — it is the merge key. The write path
/// guarantees this; readers skip records without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionRecord {
  pub fields: Fields,
}

impl VersionRecord {
  pub fn new(fields: Fields) -> Self { Self { fields } }

  /// The identity this version belongs to, if well formed.
  pub fn id(&self) -> Option<i64> {
    self.fields.get(crate::schema::ID).and_then(Value::as_int)
  }

  pub fn get(&self, column: &str) -> Option<&Value> { self.fields.get(column) }
}

// ─── ResolvedRecord ──────────────────────────────────────────────────────────

/// The merged state of one identity — computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedRecord {
  pub fields: Fields,
}

impl ResolvedRecord {
  pub fn get(&self, column: &str) -> Option<&Value> { self.fields.get(column) }

  pub fn id(&self) -> Option<i64> {
    self.fields.get(crate::schema::ID).and_then(Value::as_int)
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One historical state of an identity: the cumulative merge of its versions
/// up to and including the version at `position`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
  /// Log position of the version record that produced this state.
  pub position: LogPosition,
  pub record:   ResolvedRecord,
}

// ─── NewVersion ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::append`].
///
/// `fields` holds the caller-supplied columns (possibly including an explicit
/// `id` to write a new version of an existing identity). The store fills
/// `id` (auto-assigned), `timestamp`, `user` and `active` when unset;
/// `actor` is the resolved identity recorded into `user`.
#[derive(Debug, Clone)]
pub struct NewVersion {
  pub fields: Fields,
  pub actor:  String,
}

impl NewVersion {
  pub fn new(fields: Fields, actor: impl Into<String>) -> Self {
    Self { fields, actor: actor.into() }
  }
}
