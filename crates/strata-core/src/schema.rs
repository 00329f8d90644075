//! Schema — the per-table column name → type mapping.
//!
//! Every schema begins with the four system columns (`id`, `timestamp`,
//! `user`, `active`); user-defined columns follow in declaration order.
//! Schemas are immutable once a table is created. The descriptor serialises
//! as a single JSON object whose key order is the column order, so `Schema`
//! carries hand-written `Serialize`/`Deserialize` impls instead of derives.

use std::fmt;

use serde::{
  Deserialize, Deserializer, Serialize, Serializer,
  de::{MapAccess, Visitor},
  ser::SerializeMap,
};

use crate::{
  Error, Result,
  record::Fields,
  value::{ColumnType, Value},
};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// One named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
  pub name: String,
  pub ty:   ColumnType,
}

impl Column {
  pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
    Self { name: name.into(), ty }
  }
}

/// The fixed system columns, in the order they appear in every schema.
pub const SYSTEM_COLUMNS: [(&str, ColumnType); 4] = [
  ("id", ColumnType::Int),
  ("timestamp", ColumnType::Int),
  ("user", ColumnType::Text),
  ("active", ColumnType::Bool),
];

/// The identity / merge-key column.
pub const ID: &str = "id";
/// Epoch-seconds write timestamp, set by the write path.
pub const TIMESTAMP: &str = "timestamp";
/// The recorded actor, set by the write path.
pub const USER: &str = "user";
/// The soft-delete marker; defaults to `true` on first write of an identity.
pub const ACTIVE: &str = "active";

// ─── Schema ──────────────────────────────────────────────────────────────────

/// An ordered column list, system columns first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
  columns: Vec<Column>,
}

impl Schema {
  /// Build a schema from user-defined columns. System columns are prepended
  /// in their fixed order; a user column that reuses a system column name is
  /// ignored.
  pub fn with_user_columns(user: impl IntoIterator<Item = Column>) -> Self {
    let mut columns: Vec<Column> = SYSTEM_COLUMNS
      .iter()
      .map(|(name, ty)| Column::new(*name, *ty))
      .collect();
    for col in user {
      if !columns.iter().any(|c| c.name == col.name) {
        columns.push(col);
      }
    }
    Self { columns }
  }

  pub fn columns(&self) -> &[Column] { &self.columns }

  pub fn column_names(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.name.as_str())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.columns.iter().any(|c| c.name == name)
  }

  pub fn column_type(&self, name: &str) -> Option<ColumnType> {
    self.columns.iter().find(|c| c.name == name).map(|c| c.ty)
  }

  /// Coerce one value into the declared type of `column`, with full error
  /// context on failure.
  pub fn coerce(&self, column: &str, value: Value) -> Result<Value> {
    let ty = self
      .column_type(column)
      .ok_or_else(|| Error::UnknownColumn(column.to_owned()))?;
    let shown = value.to_string();
    value.coerce(ty).ok_or(Error::TypeMismatch {
      column:   column.to_owned(),
      expected: ty,
      value:    shown,
    })
  }

  /// Validate a field map supplied by the write path: every field name must
  /// exist in the schema and every value must coerce to its declared type.
  pub fn validate(&self, fields: Fields) -> Result<Fields> {
    fields
      .into_iter()
      .map(|(name, value)| {
        let coerced = self.coerce(&name, value)?;
        Ok((name, coerced))
      })
      .collect()
  }
}

// ─── Serde ───────────────────────────────────────────────────────────────────

impl Serialize for Schema {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.columns.len()))?;
    for c in &self.columns {
      map.serialize_entry(&c.name, &c.ty)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Schema {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct SchemaVisitor;

    impl<'de> Visitor<'de> for SchemaVisitor {
      type Value = Schema;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of column name to column type")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Schema, A::Error> {
        let mut user = Vec::new();
        while let Some((name, ty)) = map.next_entry::<String, ColumnType>()? {
          // System columns are re-prepended below with their fixed types,
          // which also retrofits descriptors written before a system column
          // existed.
          if !SYSTEM_COLUMNS.iter().any(|(n, _)| *n == name) {
            user.push(Column { name, ty });
          }
        }
        Ok(Schema::with_user_columns(user))
      }
    }

    deserializer.deserialize_map(SchemaVisitor)
  }
}
