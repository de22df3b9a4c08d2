//! Core data model for Facet dashboards.
//!
//! This crate owns the serialization-friendly vocabulary shared by the
//! engine and its hosts: scalar cell values and their canonical ordering,
//! typed in-memory tables, declarative view recipes, chart kinds and the
//! CSV ingestion path. It performs no filtering or aggregation itself;
//! `facet-engine` executes recipes against these types.

#![forbid(unsafe_code)]

pub mod chart;
pub mod import;
pub mod recipe;
pub mod table;
pub mod value;

pub use chart::ChartKind;
pub use import::{read_table, CsvImportError, CsvOptions};
pub use recipe::{
    Aggregation, BinSpec, Encoding, GroupKey, Measure, PeriodSpec, SeriesSpec, SortSpec,
    SourceSpec, Transform, ViewRecipe,
};
pub use table::{ColumnSchema, ColumnType, Table, TableError};
pub use value::{canonical_number_bits, Scalar, ScalarKey};
