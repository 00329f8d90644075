//! The version merge resolver — a pure fold over the append-only log.
//!
//! Scanning in append order, each version record overlays its present fields
//! onto the accumulated state of its identity; absent fields are left
//! untouched. On first encounter of an identity `active` defaults to `true`
//! unless the record sets it explicitly. Because the functions here are pure
//! over a slice of `(position, record)`, resolving any prefix of an
//! identity's versions yields its state at that point in time.

use std::collections::BTreeMap;

use crate::{
  record::{Fields, LogPosition, ResolvedRecord, Snapshot, VersionRecord},
  schema::ACTIVE,
  value::Value,
};

/// Overlay `version`'s present fields onto `state`, seeding the soft-delete
/// default when `state` is brand new.
fn merge_into(state: &mut Fields, version: &VersionRecord) {
  if state.is_empty() {
    state.insert(ACTIVE.to_owned(), Value::Bool(true));
  }
  for (name, value) in &version.fields {
    state.insert(name.clone(), value.clone());
  }
}

/// Resolve the latest state of every identity, in first-appearance order.
/// Records without a usable `id` are ignored.
pub fn resolve_latest(log: &[(LogPosition, VersionRecord)]) -> Vec<ResolvedRecord> {
  resolve_latest_filtered(log, |_| true)
}

/// [`resolve_latest`], restricted to identities accepted by `keep`. Used by
/// the query engine when an index has narrowed the candidate set — the
/// accepted identities are still merged from their *full* version list.
pub fn resolve_latest_filtered(
  log: &[(LogPosition, VersionRecord)],
  keep: impl Fn(i64) -> bool,
) -> Vec<ResolvedRecord> {
  let mut order: Vec<i64> = Vec::new();
  let mut states: BTreeMap<i64, Fields> = BTreeMap::new();

  for (_, record) in log {
    let Some(id) = record.id() else { continue };
    if !keep(id) {
      continue;
    }
    let state = states.entry(id).or_insert_with(|| {
      order.push(id);
      Fields::new()
    });
    merge_into(state, record);
  }

  order
    .into_iter()
    .filter_map(|id| states.remove(&id))
    .map(|fields| ResolvedRecord { fields })
    .collect()
}

/// Resolve the cumulative history of a single identity: one snapshot per
/// version record carrying that `id`, each the merge of all versions up to
/// and including it. The last snapshot equals the identity's latest state.
pub fn resolve_history(
  log: &[(LogPosition, VersionRecord)],
  id: i64,
) -> Vec<Snapshot> {
  let mut state = Fields::new();
  let mut out = Vec::new();

  for (position, record) in log {
    if record.id() != Some(id) {
      continue;
    }
    merge_into(&mut state, record);
    out.push(Snapshot {
      position: *position,
      record:   ResolvedRecord { fields: state.clone() },
    });
  }

  out
}

/// Every historical snapshot of every identity, in log order of the version
/// that produced each state. This is the `history = true` select path.
pub fn resolve_all_histories(
  log: &[(LogPosition, VersionRecord)],
) -> Vec<Snapshot> {
  let mut states: BTreeMap<i64, Fields> = BTreeMap::new();
  let mut out = Vec::new();

  for (position, record) in log {
    let Some(id) = record.id() else { continue };
    let state = states.entry(id).or_default();
    merge_into(state, record);
    out.push(Snapshot {
      position: *position,
      record:   ResolvedRecord { fields: state.clone() },
    });
  }

  out
}
