//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `strata-store-ndjson`).
//! The CLI depends on this abstraction, not on any concrete backend.
//!
//! All methods are synchronous: every operation is a bounded scan or append
//! over a local file, and the store assumes a single active writer at a time
//! (cross-process locking is a write-path collaborator concern, outside this
//! core). Reads are pure functions over the log snapshot taken at call time.

use crate::{
  Error, Result,
  filter::Predicate,
  order::SortKey,
  record::{Fields, NewVersion, ResolvedRecord, Snapshot, VersionRecord},
  schema::{Column, Schema},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Which columns a select returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
  /// All schema columns (`*`).
  #[default]
  All,
  Columns(Vec<String>),
}

impl Projection {
  /// Every projected column must exist in the schema.
  pub fn validate(&self, schema: &Schema) -> Result<()> {
    if let Self::Columns(names) = self {
      for name in names {
        if !schema.contains(name) {
          return Err(Error::UnknownColumn(name.clone()));
        }
      }
    }
    Ok(())
  }

  /// Keep only the projected fields. A projected column the record never
  /// set simply stays absent from the output.
  pub fn apply(&self, fields: &Fields) -> Fields {
    match self {
      Self::All => fields.clone(),
      Self::Columns(names) => names
        .iter()
        .filter_map(|n| fields.get(n).map(|v| (n.clone(), v.clone())))
        .collect(),
    }
  }
}

/// Parameters for [`RecordStore::select`].
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
  pub projection: Projection,
  pub predicate:  Option<Predicate>,
  /// Explicit ORDER keys. When empty, current-state selects default to
  /// ascending `id`; history selects keep log order.
  pub order:      Vec<SortKey>,
  /// `true`: return every historical snapshot of every identity instead of
  /// one current record per identity.
  pub history:    bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Strata storage backend.
///
/// Writes are append-only: no operation ever removes or rewrites an existing
/// version record. "Deletion" is [`RecordStore::deactivate`] — appending a
/// version with `active = false`. Indexes are derived, disposable caches;
/// losing one may change query cost but never query results.
pub trait RecordStore {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tables ────────────────────────────────────────────────────────────

  /// Create a table: persist the schema descriptor (system columns
  /// enforced) and an empty version log.
  fn create_table(
    &self,
    table: &str,
    user_columns: Vec<Column>,
  ) -> Result<Schema, Self::Error>;

  /// Load a table's schema. Fails with `UnknownTable` if it does not exist.
  fn schema(&self, table: &str) -> Result<Schema, Self::Error>;

  /// All table names, sorted.
  fn list_tables(&self) -> Result<Vec<String>, Self::Error>;

  // ── Append-only writes ────────────────────────────────────────────────

  /// Validate and append one version record, returning it as written.
  ///
  /// `id` is auto-assigned (one greater than the maximum ever seen) when the
  /// caller omits it; a caller-supplied `id` is taken as-is, which is how a
  /// new version of an existing identity is written. `timestamp`, `user`,
  /// and `active` are filled when unset.
  fn append(
    &self,
    table: &str,
    input: NewVersion,
  ) -> Result<VersionRecord, Self::Error>;

  /// Soft-delete: append a version with `active = false` and every user
  /// column absent. The identity stays fully visible in history.
  fn deactivate(
    &self,
    table: &str,
    id: i64,
    actor: &str,
  ) -> Result<VersionRecord, Self::Error>;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Run a query: resolve (latest state per identity, or every historical
  /// snapshot), filter, sort, project.
  fn select(
    &self,
    table: &str,
    query: &SelectQuery,
  ) -> Result<Vec<ResolvedRecord>, Self::Error>;

  /// The cumulative version history of one identity, log-ordered and
  /// unfiltered.
  fn history(&self, table: &str, id: i64) -> Result<Vec<Snapshot>, Self::Error>;

  // ── Indexes ───────────────────────────────────────────────────────────

  /// Build an exact-match index over one column by a full log scan.
  /// Building an index that already exists is a no-op success.
  fn create_index(&self, table: &str, column: &str) -> Result<(), Self::Error>;

  /// Remove an index. Dropping a non-existent index is a no-op success.
  fn drop_index(&self, table: &str, column: &str) -> Result<(), Self::Error>;
}
