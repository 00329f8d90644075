//! The value model — a closed sum type used uniformly by the schema,
//! the filter evaluator, and the sort comparator.
//!
//! A field slot in a version record is either a concrete [`Value`] or absent
//! (the key is simply omitted from the record), meaning "no change to this
//! field from the prior version of the same identity".

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Column types ────────────────────────────────────────────────────────────

/// The declared type of a column. The serialised names are the strings used
/// in schema descriptor files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
  Int,
  Float,
  Bool,
  Text,
}

impl ColumnType {
  /// The descriptor string stored in schema files.
  pub fn name(self) -> &'static str {
    match self {
      Self::Int => "int",
      Self::Float => "float",
      Self::Bool => "bool",
      Self::Text => "text",
    }
  }
}

impl fmt::Display for ColumnType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Value ───────────────────────────────────────────────────────────────────

/// A concrete typed value. Serialises as the bare JSON scalar, so a version
/// record round-trips as a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Int(i64),
  Float(f64),
  Bool(bool),
  Text(String),
}

impl Value {
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Self::Int(n) => Some(*n),
      _ => None,
    }
  }

  /// Coerce into the declared column type. Returns `None` when the coercion
  /// is impossible (e.g. non-numeric text into an int column); the schema
  /// layer turns that into a `TypeMismatch` with full context.
  pub fn coerce(self, ty: ColumnType) -> Option<Value> {
    match (ty, self) {
      (ColumnType::Int, Value::Int(n)) => Some(Value::Int(n)),
      (ColumnType::Int, Value::Float(f)) => Some(Value::Int(f.trunc() as i64)),
      (ColumnType::Int, Value::Bool(b)) => Some(Value::Int(i64::from(b))),
      (ColumnType::Int, Value::Text(s)) => {
        s.trim().parse::<i64>().ok().map(Value::Int)
      }

      (ColumnType::Float, Value::Float(f)) => Some(Value::Float(f)),
      (ColumnType::Float, Value::Int(n)) => Some(Value::Float(n as f64)),
      (ColumnType::Float, Value::Bool(b)) => {
        Some(Value::Float(if b { 1.0 } else { 0.0 }))
      }
      (ColumnType::Float, Value::Text(s)) => {
        s.trim().parse::<f64>().ok().map(Value::Float)
      }

      (ColumnType::Bool, Value::Bool(b)) => Some(Value::Bool(b)),
      (ColumnType::Bool, Value::Int(n)) => Some(Value::Bool(n != 0)),
      (ColumnType::Bool, Value::Text(s)) => match s.trim() {
        s if s.eq_ignore_ascii_case("true") => Some(Value::Bool(true)),
        s if s.eq_ignore_ascii_case("false") => Some(Value::Bool(false)),
        _ => None,
      },
      (ColumnType::Bool, Value::Float(_)) => None,

      (ColumnType::Text, v) => Some(Value::Text(v.to_string())),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(n) => write!(f, "{n}"),
      Self::Float(x) => write!(f, "{x}"),
      Self::Bool(b) => write!(f, "{b}"),
      Self::Text(s) => f.write_str(s),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scalar_json_round_trip() {
    let values = [
      Value::Int(42),
      Value::Float(2.5),
      Value::Bool(true),
      Value::Text("hello".into()),
    ];
    for v in values {
      let json = serde_json::to_string(&v).unwrap();
      let back: Value = serde_json::from_str(&json).unwrap();
      assert_eq!(back, v);
    }
  }

  #[test]
  fn whole_json_numbers_deserialize_as_int() {
    let v: Value = serde_json::from_str("7").unwrap();
    assert_eq!(v, Value::Int(7));
    let v: Value = serde_json::from_str("7.0").unwrap();
    assert_eq!(v, Value::Float(7.0));
  }

  #[test]
  fn coerce_numeric_text() {
    assert_eq!(Value::Text("12".into()).coerce(ColumnType::Int), Some(Value::Int(12)));
    assert_eq!(
      Value::Text("2.5".into()).coerce(ColumnType::Float),
      Some(Value::Float(2.5))
    );
    assert_eq!(Value::Text("twelve".into()).coerce(ColumnType::Int), None);
  }

  #[test]
  fn coerce_bool_accepts_only_true_false_text() {
    assert_eq!(
      Value::Text("TRUE".into()).coerce(ColumnType::Bool),
      Some(Value::Bool(true))
    );
    assert_eq!(Value::Text("yes".into()).coerce(ColumnType::Bool), None);
  }

  #[test]
  fn coerce_everything_to_text() {
    assert_eq!(
      Value::Int(3).coerce(ColumnType::Text),
      Some(Value::Text("3".into()))
    );
    assert_eq!(
      Value::Bool(false).coerce(ColumnType::Text),
      Some(Value::Text("false".into()))
    );
  }

  #[test]
  fn int_widens_to_float() {
    assert_eq!(Value::Int(4).coerce(ColumnType::Float), Some(Value::Float(4.0)));
  }
}
