//! [`NdjsonStore`] — the file-backed implementation of [`RecordStore`].
//!
//! The select pipeline: scan the log → resolve (latest state per identity,
//! or every historical snapshot) → filter → sort → project. When an
//! equality atom of the predicate hits a live index, the index narrows
//! which identities get resolved; candidates are still merged from their
//! full version list and re-checked against the predicate, so results never
//! depend on index presence.

use std::{
  collections::{BTreeSet, HashMap},
  fs,
  path::PathBuf,
};

use chrono::Utc;
use strata_core::{
  filter::{CompareOp, Literal, Predicate},
  order::{SortKey, sort_records},
  record::{
    Fields, LogPosition, NewVersion, ResolvedRecord, Snapshot, VersionRecord,
  },
  resolve::{resolve_all_histories, resolve_history, resolve_latest_filtered},
  schema::{ACTIVE, Column, ID, Schema, TIMESTAMP, USER},
  store::{RecordStore, SelectQuery},
  value::Value,
};

use crate::{
  Error, Result,
  index::{self, IndexFile},
  log::LogFile,
};

const SCHEMA_EXT: &str = "schema.json";
const LOG_EXT: &str = "ndjson";
const INDEX_EXT: &str = "idx.json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Strata record store backed by per-table NDJSON files in one directory.
#[derive(Debug, Clone)]
pub struct NdjsonStore {
  data_dir: PathBuf,
}

impl NdjsonStore {
  /// Open (or create) a store rooted at `data_dir`.
  pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
    let data_dir = data_dir.into();
    fs::create_dir_all(&data_dir)?;
    Ok(Self { data_dir })
  }

  fn table_path(&self, table: &str, ext: &str) -> PathBuf {
    self.data_dir.join(format!("{table}.{ext}"))
  }

  fn log_file(&self, table: &str) -> LogFile {
    LogFile::new(self.table_path(table, LOG_EXT))
  }

  fn index_file(&self, table: &str, column: &str) -> IndexFile {
    IndexFile::new(self.data_dir.join(format!("{table}.{column}.{INDEX_EXT}")))
  }

  /// Columns of `table` that currently have an index file on disk.
  fn indexed_columns(&self, table: &str) -> Result<Vec<String>> {
    let prefix = format!("{table}.");
    let suffix = format!(".{INDEX_EXT}");
    let mut columns = Vec::new();
    for entry in fs::read_dir(&self.data_dir)? {
      let name = entry?.file_name();
      let Some(name) = name.to_str() else { continue };
      if let Some(rest) = name.strip_prefix(&prefix)
        && let Some(column) = rest.strip_suffix(&suffix)
        && !column.is_empty()
        && !column.contains('.')
      {
        columns.push(column.to_owned());
      }
    }
    Ok(columns)
  }

  /// Record a fresh append into every live index of the table.
  fn update_indexes(
    &self,
    table: &str,
    record: &VersionRecord,
    position: LogPosition,
  ) -> Result<()> {
    for column in self.indexed_columns(table)? {
      self
        .index_file(table, &column)
        .record_append(&column, record, position)?;
    }
    Ok(())
  }

  /// Append a fully-built record and keep indexes current.
  fn append_record(&self, table: &str, record: &VersionRecord) -> Result<LogPosition> {
    let position = self.log_file(table).append(record)?;
    self.update_indexes(table, record, position)?;
    Ok(position)
  }

  /// One greater than the maximum `id` ever seen in the log; 1 for an empty
  /// table.
  fn next_id(log: &[(LogPosition, VersionRecord)]) -> i64 {
    log
      .iter()
      .filter_map(|(_, r)| r.id())
      .max()
      .unwrap_or(0)
      + 1
  }

  /// Use the first equality atom with a live index to narrow the identities
  /// worth resolving. `None` means "no usable index — resolve everything".
  ///
  /// The index is keyed on raw version-record values, so the returned set is
  /// a superset of the identities that can match the atom; the predicate is
  /// re-applied to the resolved records afterwards.
  fn candidate_ids(
    &self,
    table: &str,
    schema: &Schema,
    log: &[(LogPosition, VersionRecord)],
    predicate: Option<&Predicate>,
  ) -> Result<Option<BTreeSet<i64>>> {
    let Some(predicate) = predicate else { return Ok(None) };

    for atom in predicate.comparisons() {
      if atom.op != CompareOp::Eq {
        continue;
      }
      let file = self.index_file(table, &atom.column);
      let Some(map) = file.load() else { continue };

      let key = match &atom.literal {
        Literal::Null => index::key_for(None),
        Literal::Value(v) => {
          let coerced = schema.coerce(&atom.column, v.clone())?;
          index::key_for(Some(&coerced))
        }
      };

      let by_position: HashMap<LogPosition, i64> = log
        .iter()
        .filter_map(|(pos, r)| r.id().map(|id| (*pos, id)))
        .collect();

      let ids = map
        .get(&key)
        .map(|positions| {
          positions
            .iter()
            .filter_map(|pos| by_position.get(pos).copied())
            .collect()
        })
        .unwrap_or_default();
      return Ok(Some(ids));
    }

    Ok(None)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for NdjsonStore {
  type Error = Error;

  // ── Tables ────────────────────────────────────────────────────────────────

  fn create_table(&self, table: &str, user_columns: Vec<Column>) -> Result<Schema> {
    let schema = Schema::with_user_columns(user_columns);
    fs::write(
      self.table_path(table, SCHEMA_EXT),
      serde_json::to_string(&schema)?,
    )?;
    self.log_file(table).create()?;
    Ok(schema)
  }

  fn schema(&self, table: &str) -> Result<Schema> {
    let content = match fs::read_to_string(self.table_path(table, SCHEMA_EXT)) {
      Ok(s) => s,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Err(strata_core::Error::UnknownTable(table.to_owned()).into());
      }
      Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
  }

  fn list_tables(&self) -> Result<Vec<String>> {
    let suffix = format!(".{SCHEMA_EXT}");
    let mut tables = Vec::new();
    for entry in fs::read_dir(&self.data_dir)? {
      let name = entry?.file_name();
      if let Some(name) = name.to_str()
        && let Some(table) = name.strip_suffix(&suffix)
        && !table.is_empty()
      {
        tables.push(table.to_owned());
      }
    }
    tables.sort();
    Ok(tables)
  }

  // ── Append-only writes ────────────────────────────────────────────────────

  fn append(&self, table: &str, input: NewVersion) -> Result<VersionRecord> {
    let schema = self.schema(table)?;
    let mut fields = schema.validate(input.fields)?;

    if !fields.contains_key(ID) {
      let log = self.log_file(table).scan()?;
      fields.insert(ID.to_owned(), Value::Int(Self::next_id(&log)));
    }
    fields
      .entry(TIMESTAMP.to_owned())
      .or_insert_with(|| Value::Int(Utc::now().timestamp()));
    fields
      .entry(USER.to_owned())
      .or_insert_with(|| Value::Text(input.actor));
    fields.entry(ACTIVE.to_owned()).or_insert(Value::Bool(true));

    let record = VersionRecord::new(fields);
    self.append_record(table, &record)?;
    Ok(record)
  }

  fn deactivate(&self, table: &str, id: i64, actor: &str) -> Result<VersionRecord> {
    // Schema load doubles as the UnknownTable check.
    self.schema(table)?;

    let mut fields = Fields::new();
    fields.insert(ID.to_owned(), Value::Int(id));
    fields.insert(TIMESTAMP.to_owned(), Value::Int(Utc::now().timestamp()));
    fields.insert(USER.to_owned(), Value::Text(actor.to_owned()));
    fields.insert(ACTIVE.to_owned(), Value::Bool(false));

    let record = VersionRecord::new(fields);
    self.append_record(table, &record)?;
    Ok(record)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<ResolvedRecord>> {
    let schema = self.schema(table)?;
    query.projection.validate(&schema)?;
    for key in &query.order {
      if !schema.contains(&key.column) {
        return Err(strata_core::Error::UnknownColumn(key.column.clone()).into());
      }
    }

    let log = self.log_file(table).scan()?;

    let resolved: Vec<ResolvedRecord> = if query.history {
      resolve_all_histories(&log)
        .into_iter()
        .map(|s| s.record)
        .collect()
    } else {
      match self.candidate_ids(table, &schema, &log, query.predicate.as_ref())? {
        Some(ids) => resolve_latest_filtered(&log, |id| ids.contains(&id)),
        None => resolve_latest_filtered(&log, |_| true),
      }
    };

    let mut rows = Vec::with_capacity(resolved.len());
    match &query.predicate {
      Some(predicate) => {
        for record in resolved {
          if predicate.matches(&record.fields, &schema)? {
            rows.push(record);
          }
        }
      }
      None => rows = resolved,
    }

    if query.history {
      // No explicit order: history keeps log order.
      sort_records(&mut rows, &query.order);
    } else {
      let default = [SortKey::asc(ID)];
      let keys: &[SortKey] =
        if query.order.is_empty() { &default } else { &query.order };
      sort_records(&mut rows, keys);
    }

    Ok(
      rows
        .into_iter()
        .map(|r| ResolvedRecord { fields: query.projection.apply(&r.fields) })
        .collect(),
    )
  }

  fn history(&self, table: &str, id: i64) -> Result<Vec<Snapshot>> {
    self.schema(table)?;
    let log = self.log_file(table).scan()?;
    Ok(resolve_history(&log, id))
  }

  // ── Indexes ───────────────────────────────────────────────────────────────

  fn create_index(&self, table: &str, column: &str) -> Result<()> {
    let schema = self.schema(table)?;
    if !schema.contains(column) {
      return Err(strata_core::Error::UnknownColumn(column.to_owned()).into());
    }

    let file = self.index_file(table, column);
    if file.exists() {
      // Idempotent: the live index is already kept current on every append.
      return Ok(());
    }

    let log = self.log_file(table).scan()?;
    file.save(&index::build(&log, column))
  }

  fn drop_index(&self, table: &str, column: &str) -> Result<()> {
    self.index_file(table, column).delete()
  }
}
