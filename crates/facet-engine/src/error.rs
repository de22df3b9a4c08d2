//! Engine-wide error type.
//!
//! Every failure names the recipe, table or column it is about, so a
//! startup log line is enough to locate a broken catalogue entry. Empty
//! results are deliberately not represented here: an empty filter
//! selection derives an empty table, it does not fail.

use facet_model::{Scalar, TableError};
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("unknown recipe: {0}")]
    UnknownRecipe(String),
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("duplicate recipe: {0}")]
    DuplicateRecipe(String),
    /// A filter selection offered a value the dimension catalogue does not
    /// contain. The filter state is left untouched.
    #[error("invalid value for dimension {dimension}: {value}")]
    InvalidFilterValue { dimension: String, value: Scalar },
    /// A recipe references a column its source table does not have.
    #[error("recipe {recipe} references missing column {table}[{column}]")]
    SchemaMismatch {
        recipe: String,
        table: String,
        column: String,
    },
    #[error("invalid recipe {recipe}: {reason}")]
    InvalidRecipe { recipe: String, reason: String },
    /// The filtered inputs of a recompute exceeded the configured row
    /// budget before any transform ran.
    #[error("recipe {recipe} would read {rows} rows, over the budget of {limit}")]
    BudgetExceeded {
        recipe: String,
        rows: usize,
        limit: usize,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}
