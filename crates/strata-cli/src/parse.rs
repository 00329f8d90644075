//! String surfaces of the CLI: literal values, `col=val` lists, column
//! definitions, WHERE conjunctions, and ORDER key lists.
//!
//! These parsers produce the typed inputs the core consumes; all type
//! checking against a schema happens in the core, not here (except ORDER,
//! which validates column names up front so a typo fails before any scan).

use anyhow::{Context as _, Result, bail};
use strata_core::{
  filter::{CompareOp, Comparison, Literal, Predicate},
  order::{Direction, SortKey},
  record::Fields,
  schema::{Column, Schema},
  store::Projection,
  value::{ColumnType, Value},
};

// ─── Literals ────────────────────────────────────────────────────────────────

/// Parse one literal: quoted text, `true`/`false`, `null`/`none`, an int, a
/// float (when the token contains a `.`), or bare text as a last resort.
pub fn parse_literal(raw: &str) -> Literal {
  let s = raw.trim();

  if s.len() >= 2 {
    let bytes = s.as_bytes();
    if (bytes[0] == b'\'' && bytes[s.len() - 1] == b'\'')
      || (bytes[0] == b'"' && bytes[s.len() - 1] == b'"')
    {
      return Literal::Value(Value::Text(s[1..s.len() - 1].to_owned()));
    }
  }

  if s.eq_ignore_ascii_case("true") {
    return Literal::Value(Value::Bool(true));
  }
  if s.eq_ignore_ascii_case("false") {
    return Literal::Value(Value::Bool(false));
  }
  if s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("none") {
    return Literal::Null;
  }

  if s.contains('.') {
    if let Ok(f) = s.parse::<f64>() {
      return Literal::Value(Value::Float(f));
    }
  } else if let Ok(n) = s.parse::<i64>() {
    return Literal::Value(Value::Int(n));
  }

  Literal::Value(Value::Text(s.to_owned()))
}

// ─── Column definitions ──────────────────────────────────────────────────────

/// Parse a `create-table` column list like `"name:text, age:int"`.
/// Type aliases: int/integer, float/real/double, bool/boolean; anything else
/// is text.
pub fn parse_column_defs(raw: &str) -> Result<Vec<Column>> {
  let mut columns = Vec::new();
  for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
    let (name, ty) = part
      .split_once(':')
      .with_context(|| format!("invalid column definition: {part:?}"))?;
    let name = name.trim();
    if name.is_empty() {
      bail!("invalid column definition: {part:?}");
    }
    let ty = match ty.trim().to_ascii_lowercase().as_str() {
      "int" | "integer" => ColumnType::Int,
      "float" | "real" | "double" => ColumnType::Float,
      "bool" | "boolean" => ColumnType::Bool,
      _ => ColumnType::Text,
    };
    columns.push(Column::new(name, ty));
  }
  Ok(columns)
}

// ─── key=value lists ─────────────────────────────────────────────────────────

/// Split a `--values` string into `key=value` pairs, honouring quotes so a
/// value like `'Doe, Jane'` keeps its comma.
fn split_kv_items(raw: &str) -> Vec<String> {
  let mut items = Vec::new();
  let mut current = String::new();
  let mut quote: Option<char> = None;

  for ch in raw.chars() {
    match quote {
      Some(q) => {
        current.push(ch);
        if ch == q {
          quote = None;
        }
      }
      None => match ch {
        '\'' | '"' => {
          quote = Some(ch);
          current.push(ch);
        }
        ',' => {
          if !current.trim().is_empty() {
            items.push(current.trim().to_owned());
          }
          current.clear();
        }
        _ => current.push(ch),
      },
    }
  }
  if !current.trim().is_empty() {
    items.push(current.trim().to_owned());
  }
  items
}

/// Parse a `--values` string into a field map. Explicit `null` values are
/// rejected: an unset field is expressed by omitting it, and "null out a
/// previously-set field" is not supported.
pub fn parse_values(raw: &str) -> Result<Fields> {
  let mut fields = Fields::new();
  for item in split_kv_items(raw) {
    let (key, value) = item
      .split_once('=')
      .with_context(|| format!("invalid key=value pair: {item:?}"))?;
    let key = key.trim();
    if key.is_empty() {
      bail!("invalid key=value pair: {item:?}");
    }
    match parse_literal(value) {
      Literal::Value(v) => {
        fields.insert(key.to_owned(), v);
      }
      Literal::Null => bail!(
        "explicit null for column {key:?} is not supported; omit the field instead"
      ),
    }
  }
  Ok(fields)
}

// ─── WHERE ───────────────────────────────────────────────────────────────────

/// Split a WHERE string on the standalone word `AND` (any case), outside
/// quotes.
fn split_conjunction(raw: &str) -> Vec<String> {
  let chars: Vec<char> = raw.chars().collect();
  let mut parts = Vec::new();
  let mut start = 0;
  let mut quote: Option<char> = None;
  let mut i = 0;

  while i < chars.len() {
    let ch = chars[i];
    if let Some(q) = quote {
      if ch == q {
        quote = None;
      }
      i += 1;
      continue;
    }
    match ch {
      '\'' | '"' => {
        quote = Some(ch);
        i += 1;
      }
      c if c.is_whitespace() => {
        // Look at the word following this whitespace run.
        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
          j += 1;
        }
        let mut k = j;
        while k < chars.len() && !chars[k].is_whitespace() {
          k += 1;
        }
        let word: String = chars[j..k].iter().collect();
        if word.eq_ignore_ascii_case("and") {
          parts.push(chars[start..i].iter().collect());
          let mut m = k;
          while m < chars.len() && chars[m].is_whitespace() {
            m += 1;
          }
          start = m;
          i = m;
        } else {
          i = j.max(i + 1);
        }
      }
      _ => i += 1,
    }
  }

  parts.push(chars[start..].iter().collect());
  parts
}

/// Parse one `column OP literal` atom.
fn parse_comparison(raw: &str) -> Result<Comparison> {
  let s = raw.trim();
  let column: String = s
    .chars()
    .take_while(|c| c.is_alphanumeric() || *c == '_')
    .collect();
  if column.is_empty() {
    bail!("invalid WHERE condition: {raw:?}");
  }

  let rest = s[column.len()..].trim_start();
  let (op, rest) = if let Some(r) = rest.strip_prefix("!=") {
    (CompareOp::Ne, r)
  } else if let Some(r) = rest.strip_prefix("<=") {
    (CompareOp::Le, r)
  } else if let Some(r) = rest.strip_prefix(">=") {
    (CompareOp::Ge, r)
  } else if let Some(r) = rest.strip_prefix('<') {
    (CompareOp::Lt, r)
  } else if let Some(r) = rest.strip_prefix('>') {
    (CompareOp::Gt, r)
  } else if let Some(r) = rest.strip_prefix('=') {
    (CompareOp::Eq, r)
  } else if let Some((word, r)) = rest.split_at_checked(5)
    && word.eq_ignore_ascii_case("ilike")
  {
    (CompareOp::ILike, r)
  } else if let Some((word, r)) = rest.split_at_checked(4)
    && word.eq_ignore_ascii_case("like")
  {
    (CompareOp::Like, r)
  } else {
    bail!("invalid WHERE condition: {raw:?}");
  };

  let value = rest.trim();
  if value.is_empty() {
    bail!("invalid WHERE condition: {raw:?}");
  }

  Ok(Comparison { column, op, literal: parse_literal(value) })
}

/// Parse a WHERE string like `"active = true AND age >= 18"` into the
/// conjunction the filter evaluator consumes.
pub fn parse_where(raw: &str) -> Result<Predicate> {
  let atoms = split_conjunction(raw)
    .into_iter()
    .filter(|p| !p.trim().is_empty())
    .map(|p| parse_comparison(&p))
    .collect::<Result<Vec<_>>>()?;
  if atoms.is_empty() {
    bail!("empty WHERE expression");
  }
  Ok(Predicate::new(atoms))
}

// ─── ORDER ───────────────────────────────────────────────────────────────────

/// Parse an ORDER string like `"name ASC, timestamp DESC"`. Unknown columns
/// and bad direction words are rejected here, before any log scan.
pub fn parse_order(raw: &str, schema: &Schema) -> Result<Vec<SortKey>> {
  let mut keys = Vec::new();
  for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
    let mut tokens = part.split_whitespace();
    let column = tokens
      .next()
      .with_context(|| format!("invalid ORDER key: {part:?}"))?;
    if !schema.contains(column) {
      bail!("ORDER BY: column {column:?} does not exist");
    }
    let direction = match tokens.next() {
      None => Direction::Asc,
      Some(word) if word.eq_ignore_ascii_case("asc") => Direction::Asc,
      Some(word) if word.eq_ignore_ascii_case("desc") => Direction::Desc,
      Some(word) => {
        bail!("ORDER BY: invalid direction {word:?} (use ASC or DESC)")
      }
    };
    if tokens.next().is_some() {
      bail!("invalid ORDER key: {part:?}");
    }
    keys.push(SortKey { column: column.to_owned(), direction });
  }
  Ok(keys)
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// `"*"` selects all columns; otherwise a comma-separated column list.
pub fn parse_projection(raw: &str) -> Projection {
  let s = raw.trim();
  if s.is_empty() || s == "*" {
    return Projection::All;
  }
  Projection::Columns(
    s.split(',')
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .map(str::to_owned)
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn schema() -> Schema {
    Schema::with_user_columns([Column::new("name", ColumnType::Text)])
  }

  #[test]
  fn literal_typing() {
    assert_eq!(parse_literal("'John'"), Literal::Value(Value::Text("John".into())));
    assert_eq!(parse_literal("\"x,y\""), Literal::Value(Value::Text("x,y".into())));
    assert_eq!(parse_literal("TRUE"), Literal::Value(Value::Bool(true)));
    assert_eq!(parse_literal("none"), Literal::Null);
    assert_eq!(parse_literal("42"), Literal::Value(Value::Int(42)));
    assert_eq!(parse_literal("4.5"), Literal::Value(Value::Float(4.5)));
    assert_eq!(parse_literal("bare"), Literal::Value(Value::Text("bare".into())));
  }

  #[test]
  fn column_defs_with_aliases() {
    let cols = parse_column_defs("name:text, age:integer, score:double, ok:boolean").unwrap();
    let tys: Vec<_> = cols.iter().map(|c| c.ty).collect();
    assert_eq!(tys, [
      ColumnType::Text,
      ColumnType::Int,
      ColumnType::Float,
      ColumnType::Bool
    ]);
    // Unrecognised type names fall back to text.
    assert_eq!(parse_column_defs("x:blob").unwrap()[0].ty, ColumnType::Text);
    assert!(parse_column_defs("no_type_here").is_err());
  }

  #[test]
  fn values_keep_quoted_commas() {
    let fields = parse_values("name='Doe, Jane', age=36").unwrap();
    assert_eq!(fields.get("name"), Some(&Value::Text("Doe, Jane".into())));
    assert_eq!(fields.get("age"), Some(&Value::Int(36)));
  }

  #[test]
  fn values_reject_explicit_null_and_bad_pairs() {
    assert!(parse_values("name=null").unwrap_err().to_string().contains("null"));
    assert!(parse_values("just a string").is_err());
  }

  #[test]
  fn where_conjunction_splits_case_insensitively() {
    let p = parse_where("active = true AND age >= 18 and name ILIKE '%a%'").unwrap();
    assert_eq!(p.comparisons().len(), 3);
    assert_eq!(p.comparisons()[1].op, CompareOp::Ge);
    assert_eq!(p.comparisons()[2].op, CompareOp::ILike);
  }

  #[test]
  fn where_does_not_split_inside_quotes() {
    let p = parse_where("name = 'rock AND roll'").unwrap();
    assert_eq!(p.comparisons().len(), 1);
    assert_eq!(
      p.comparisons()[0].literal,
      Literal::Value(Value::Text("rock AND roll".into()))
    );
  }

  #[test]
  fn where_operator_forms() {
    for (expr, op) in [
      ("id = 1", CompareOp::Eq),
      ("id != 1", CompareOp::Ne),
      ("id < 1", CompareOp::Lt),
      ("id<=1", CompareOp::Le),
      ("id > 1", CompareOp::Gt),
      ("id >= 1", CompareOp::Ge),
      ("name like '%x%'", CompareOp::Like),
      ("name ILIKE '%x%'", CompareOp::ILike),
    ] {
      let p = parse_where(expr).unwrap();
      assert_eq!(p.comparisons()[0].op, op, "{expr}");
    }
    assert!(parse_where("name ~ 'x'").is_err());
    assert!(parse_where("= 3").is_err());
  }

  #[test]
  fn where_with_multibyte_operator_text_is_an_error() {
    // Non-ASCII after the column name must not land inside the
    // LIKE/ILIKE keyword check.
    assert!(parse_where("name €€").is_err());
    assert!(parse_where("age ≥ 18").is_err());
  }

  #[test]
  fn order_parsing_and_validation() {
    let keys = parse_order("name ASC, timestamp DESC", &schema()).unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].direction, Direction::Asc);
    assert_eq!(keys[1].direction, Direction::Desc);

    // Bare column defaults to ascending.
    let keys = parse_order("name", &schema()).unwrap();
    assert_eq!(keys[0].direction, Direction::Asc);

    assert!(parse_order("salary ASC", &schema()).is_err());
    assert!(parse_order("name SIDEWAYS", &schema()).is_err());
  }

  #[test]
  fn projection_star_and_lists() {
    assert_eq!(parse_projection("*"), Projection::All);
    assert_eq!(
      parse_projection("id, name"),
      Projection::Columns(vec!["id".into(), "name".into()])
    );
  }
}
