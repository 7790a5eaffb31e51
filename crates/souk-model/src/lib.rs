//! `souk-model` holds the in-memory record table for the souk dashboard.
//!
//! The crate covers:
//! - Columnar storage with dictionary-encoded string columns and validity
//!   bitmaps (`RecordTable` / `TableBuilder`).
//! - CSV import with sample-based column type inference (`import_csv`).
//! - Per-column statistics used for filter options and degradation checks.
//!
//! The table is immutable once built; filtering and aggregation layers operate
//! on row masks over it and never mutate the loaded data.

#![forbid(unsafe_code)]

mod bitmap;
mod import;
mod table;
mod types;

pub use crate::bitmap::BitVec;
pub use crate::import::{import_csv, CsvImportError, CsvOptions, CsvTextEncoding};
pub use crate::table::{Column, ColumnSchema, ColumnStats, RecordTable, TableBuilder};
pub use crate::types::{ColumnType, Value};
