//! The filter evaluator — a conjunction of atomic comparisons applied to a
//! record's field map.
//!
//! Supported operators: `=`, `!=`, `<`, `<=`, `>`, `>=`, `LIKE`, `ILIKE`.
//! There is deliberately no OR, NOT, or grouping. Comparison is type-aware
//! via the column's declared type; `LIKE`/`ILIKE` treat `%` as "any run of
//! zero or more characters" and every other character as literal.

use std::cmp::Ordering;

use crate::{
  Error, Result,
  record::Fields,
  schema::Schema,
  value::Value,
};

// ─── Predicate types ─────────────────────────────────────────────────────────

/// A comparison literal. `Null` lets the WHERE surface test for an unset
/// field (`col = null`); it never matches under ordering operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
  Null,
  Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  Like,
  ILike,
}

/// One `column OP literal` atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
  pub column:  String,
  pub op:      CompareOp,
  pub literal: Literal,
}

/// A conjunction of comparisons — every atom must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
  comparisons: Vec<Comparison>,
}

impl Predicate {
  pub fn new(comparisons: Vec<Comparison>) -> Self { Self { comparisons } }

  pub fn comparisons(&self) -> &[Comparison] { &self.comparisons }

  /// Evaluate against a record's field map. Fails with `UnknownColumn` when
  /// an atom references a column missing from the schema, or `TypeMismatch`
  /// when a literal cannot be coerced to the column's type.
  pub fn matches(&self, fields: &Fields, schema: &Schema) -> Result<bool> {
    for atom in &self.comparisons {
      if !atom.matches(fields, schema)? {
        return Ok(false);
      }
    }
    Ok(true)
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

impl Comparison {
  fn matches(&self, fields: &Fields, schema: &Schema) -> Result<bool> {
    if !schema.contains(&self.column) {
      return Err(Error::UnknownColumn(self.column.clone()));
    }
    let field = fields.get(&self.column);

    match self.op {
      CompareOp::Eq => self.equals(field, schema),
      CompareOp::Ne => Ok(!self.equals(field, schema)?),
      CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
        self.ordered(field, schema)
      }
      CompareOp::Like => Ok(self.like(field, false)),
      CompareOp::ILike => Ok(self.like(field, true)),
    }
  }

  fn equals(&self, field: Option<&Value>, schema: &Schema) -> Result<bool> {
    match &self.literal {
      Literal::Null => Ok(field.is_none()),
      Literal::Value(v) => {
        let literal = schema.coerce(&self.column, v.clone())?;
        Ok(match field {
          None => false,
          Some(f) => values_equal(f, &literal),
        })
      }
    }
  }

  fn ordered(&self, field: Option<&Value>, schema: &Schema) -> Result<bool> {
    // A missing field or a null literal never satisfies an ordering op.
    let (Some(field), Literal::Value(v)) = (field, &self.literal) else {
      return Ok(false);
    };
    let literal = schema.coerce(&self.column, v.clone())?;
    let Some(ord) = compare_values(field, &literal) else {
      return Ok(false);
    };
    Ok(match self.op {
      CompareOp::Lt => ord == Ordering::Less,
      CompareOp::Le => ord != Ordering::Greater,
      CompareOp::Gt => ord == Ordering::Greater,
      CompareOp::Ge => ord != Ordering::Less,
      _ => unreachable!("ordered() only sees ordering operators"),
    })
  }

  fn like(&self, field: Option<&Value>, case_insensitive: bool) -> bool {
    let Literal::Value(pattern) = &self.literal else {
      return false;
    };
    let Some(field) = field else { return false };
    like_match(&field.to_string(), &pattern.to_string(), case_insensitive)
  }
}

/// Type-aware equality: ints and floats cross-compare numerically; other
/// types must match exactly.
fn values_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => {
      (*x as f64) == *y
    }
    _ => a == b,
  }
}

/// Type-aware ordering for filter comparisons. Text compares
/// case-sensitively here — case folding is a sort-comparator concern.
/// Returns `None` for incomparable mixes (e.g. text against bool).
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
  match (a, b) {
    (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
    (Value::Float(x), Value::Float(y)) => Some(x.total_cmp(y)),
    (Value::Int(x), Value::Float(y)) => Some((*x as f64).total_cmp(y)),
    (Value::Float(x), Value::Int(y)) => Some(x.total_cmp(&(*y as f64))),
    (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
    (Value::Text(x), Value::Text(y)) => Some(x.cmp(y)),
    _ => None,
  }
}

// ─── LIKE matching ───────────────────────────────────────────────────────────

/// Match `text` against a `%`-wildcard pattern. Splits the pattern on `%`;
/// the first segment anchors at the start, the last at the end, and interior
/// segments must appear in order.
fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
  let (text, pattern) = if case_insensitive {
    (text.to_lowercase(), pattern.to_lowercase())
  } else {
    (text.to_owned(), pattern.to_owned())
  };

  let segments: Vec<&str> = pattern.split('%').collect();
  if segments.len() == 1 {
    return text == pattern;
  }

  let first = segments[0];
  let last = segments[segments.len() - 1];
  if !text.starts_with(first) {
    return false;
  }

  let mut rest = &text[first.len()..];
  for segment in &segments[1..segments.len() - 1] {
    if segment.is_empty() {
      continue;
    }
    match rest.find(segment) {
      Some(at) => rest = &rest[at + segment.len()..],
      None => return false,
    }
  }

  last.is_empty() || rest.ends_with(last)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    schema::Column,
    value::ColumnType,
  };

  fn schema() -> Schema {
    Schema::with_user_columns([
      Column::new("name", ColumnType::Text),
      Column::new("email", ColumnType::Text),
      Column::new("age", ColumnType::Int),
      Column::new("score", ColumnType::Float),
    ])
  }

  fn fields(pairs: &[(&str, Value)]) -> Fields {
    pairs
      .iter()
      .map(|(k, v)| ((*k).to_owned(), v.clone()))
      .collect()
  }

  fn atom(column: &str, op: CompareOp, literal: Literal) -> Predicate {
    Predicate::new(vec![Comparison { column: column.into(), op, literal }])
  }

  fn lit(v: Value) -> Literal { Literal::Value(v) }

  #[test]
  fn equality_is_type_aware() {
    let f = fields(&[("age", Value::Int(36))]);
    // A text literal coerces into the int column before comparing.
    let p = atom("age", CompareOp::Eq, lit(Value::Text("36".into())));
    assert!(p.matches(&f, &schema()).unwrap());
  }

  #[test]
  fn int_and_float_cross_compare() {
    let f = fields(&[("score", Value::Float(4.0))]);
    let p = atom("score", CompareOp::Eq, lit(Value::Int(4)));
    assert!(p.matches(&f, &schema()).unwrap());
  }

  #[test]
  fn null_literal_matches_missing_field_only() {
    let s = schema();
    let unset = fields(&[("age", Value::Int(1))]);
    let set = fields(&[("name", Value::Text("ada".into()))]);

    let p = atom("name", CompareOp::Eq, Literal::Null);
    assert!(p.matches(&unset, &s).unwrap());
    assert!(!p.matches(&set, &s).unwrap());

    let p = atom("name", CompareOp::Ne, Literal::Null);
    assert!(p.matches(&set, &s).unwrap());
  }

  #[test]
  fn ordering_operators_never_match_missing_fields() {
    let f = Fields::new();
    for op in [CompareOp::Lt, CompareOp::Le, CompareOp::Gt, CompareOp::Ge] {
      let p = atom("age", op, lit(Value::Int(10)));
      assert!(!p.matches(&f, &schema()).unwrap());
    }
  }

  #[test]
  fn ordering_operator_bounds() {
    let s = schema();
    let f = fields(&[("age", Value::Int(18))]);
    assert!(atom("age", CompareOp::Ge, lit(Value::Int(18))).matches(&f, &s).unwrap());
    assert!(atom("age", CompareOp::Le, lit(Value::Int(18))).matches(&f, &s).unwrap());
    assert!(!atom("age", CompareOp::Lt, lit(Value::Int(18))).matches(&f, &s).unwrap());
    assert!(atom("age", CompareOp::Gt, lit(Value::Int(17))).matches(&f, &s).unwrap());
  }

  #[test]
  fn like_is_case_sensitive_ilike_is_not() {
    let s = schema();
    let f = fields(&[("email", Value::Text("x@example.com".into()))]);

    let pattern = lit(Value::Text("%@EXAMPLE.com".into()));
    let like = atom("email", CompareOp::Like, pattern.clone());
    let ilike = atom("email", CompareOp::ILike, pattern);

    assert!(!like.matches(&f, &s).unwrap());
    assert!(ilike.matches(&f, &s).unwrap());
  }

  #[test]
  fn like_wildcard_positions() {
    assert!(like_match("alice", "al%", false));
    assert!(like_match("alice", "%ce", false));
    assert!(like_match("alice", "a%c%", false));
    assert!(like_match("alice", "%", false));
    assert!(like_match("alice", "alice", false));
    assert!(!like_match("alice", "al", false));
    assert!(!like_match("alice", "%x%", false));
    // `%` matches zero characters too.
    assert!(like_match("ab", "a%b", false));
  }

  #[test]
  fn conjunction_requires_every_atom() {
    let s = schema();
    let f = fields(&[
      ("age", Value::Int(30)),
      ("name", Value::Text("ada".into())),
    ]);
    let p = Predicate::new(vec![
      Comparison {
        column:  "age".into(),
        op:      CompareOp::Ge,
        literal: lit(Value::Int(18)),
      },
      Comparison {
        column:  "name".into(),
        op:      CompareOp::Eq,
        literal: lit(Value::Text("bea".into())),
      },
    ]);
    assert!(!p.matches(&f, &s).unwrap());
  }

  #[test]
  fn unknown_column_and_bad_literal_are_errors() {
    let s = schema();
    let f = Fields::new();

    let p = atom("height", CompareOp::Eq, lit(Value::Int(1)));
    assert!(matches!(p.matches(&f, &s), Err(Error::UnknownColumn(_))));

    let p = atom("age", CompareOp::Gt, lit(Value::Text("old".into())));
    let f = fields(&[("age", Value::Int(3))]);
    assert!(matches!(p.matches(&f, &s), Err(Error::TypeMismatch { .. })));
  }
}
