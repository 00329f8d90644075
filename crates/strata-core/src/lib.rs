//! Core types and trait definitions for the Strata record store.
//!
//! Strata is an append-only, multi-version record store: every write appends
//! an immutable version record to a per-table log, and readers reconstruct
//! either the latest logical state of each identity or its full version
//! history. This crate holds the value model, schema validation, the merge
//! resolver, the filter evaluator, and the sort comparator — it is
//! deliberately free of file-system and CLI dependencies. Storage backends
//! implement [`store::RecordStore`].

pub mod error;
pub mod filter;
pub mod order;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod store;
pub mod value;

pub use error::{Error, Result};
