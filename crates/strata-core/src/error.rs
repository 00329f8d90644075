//! Error types for `strata-core`.

use thiserror::Error;

use crate::value::ColumnType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("table not found: {0:?}")]
  UnknownTable(String),

  #[error("unknown column: {0:?}")]
  UnknownColumn(String),

  #[error("cannot coerce {value} into {expected} column {column:?}")]
  TypeMismatch {
    column:   String,
    expected: ColumnType,
    value:    String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
