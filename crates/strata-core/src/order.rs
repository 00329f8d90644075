//! The sort comparator — type-aware, multi-key ordering with an absolute
//! null policy.
//!
//! Keys are evaluated lexicographically: the first key decides unless equal,
//! then the next, and so on. A missing value always sorts as the minimum,
//! regardless of column type or direction — NULLS FIRST is not flipped by
//! `DESC`. Text compares case-insensitively; `false < true` for bools.

use std::cmp::Ordering;

use crate::{
  record::{Fields, ResolvedRecord},
  value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
  #[default]
  Asc,
  Desc,
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
  pub column:    String,
  pub direction: Direction,
}

impl SortKey {
  pub fn asc(column: impl Into<String>) -> Self {
    Self { column: column.into(), direction: Direction::Asc }
  }

  pub fn desc(column: impl Into<String>) -> Self {
    Self { column: column.into(), direction: Direction::Desc }
  }
}

/// Compare two field maps under an ordered key list. Callers validate key
/// columns against the schema before sorting; an unknown column here simply
/// compares as missing on both sides. Values were coerced to their declared
/// column type when written, so the runtime type drives the comparison.
pub fn compare(a: &Fields, b: &Fields, keys: &[SortKey]) -> Ordering {
  for key in keys {
    let va = a.get(&key.column);
    let vb = b.get(&key.column);

    // Null policy is absolute: decided before the direction applies.
    let ord = match (va, vb) {
      (None, None) => Ordering::Equal,
      (None, Some(_)) => return Ordering::Less,
      (Some(_), None) => return Ordering::Greater,
      (Some(x), Some(y)) => {
        let ord = compare_present(x, y);
        match key.direction {
          Direction::Asc => ord,
          Direction::Desc => ord.reverse(),
        }
      }
    };

    if ord != Ordering::Equal {
      return ord;
    }
  }
  Ordering::Equal
}

/// Sort resolved records in place. Stable, so records equal under every key
/// keep their incoming (log/identity) order.
pub fn sort_records(records: &mut [ResolvedRecord], keys: &[SortKey]) {
  if keys.is_empty() {
    return;
  }
  records.sort_by(|a, b| compare(&a.fields, &b.fields, keys));
}

/// Type-aware ordering of two present values. Text folds case; numeric types
/// cross-compare; incomparable mixes fall back to their display strings so
/// the ordering stays total.
fn compare_present(a: &Value, b: &Value) -> Ordering {
  match (a, b) {
    (Value::Int(x), Value::Int(y)) => x.cmp(y),
    (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
    (Value::Int(x), Value::Float(y)) => (*x as f64).total_cmp(y),
    (Value::Float(x), Value::Int(y)) => x.total_cmp(&(*y as f64)),
    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
    (Value::Text(x), Value::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
    (x, y) => x.to_string().cmp(&y.to_string()),
  }
}
