//! The six payment datasets and their declared schemas.
//!
//! Only the columns the view catalogue reads are declared; extra CSV
//! columns are ignored at load time. `state_name` and `category_name` are
//! the two filterable dimensions. The devices table carries neither, so
//! every filter passes through it untouched.

use std::io;

use facet_model::{read_table, ColumnSchema, ColumnType, CsvImportError, CsvOptions, Table};
use thiserror::Error;

pub const TRANSACTIONS: &str = "transactions";
pub const DEVICES: &str = "devices";
pub const INSURANCE: &str = "insurance";
pub const GROWTH: &str = "growth";
pub const ENGAGEMENT: &str = "engagement";
pub const CATEGORY_TRENDS: &str = "category_trends";

pub const DATASETS: [&str; 6] = [
    TRANSACTIONS,
    DEVICES,
    INSURANCE,
    GROWTH,
    ENGAGEMENT,
    CATEGORY_TRENDS,
];

/// The filterable dimensions, in catalogue order.
pub const DIMENSIONS: [&str; 2] = ["state_name", "category_name"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
    #[error(transparent)]
    Import(#[from] CsvImportError),
}

/// Declared schema of a dataset, or `None` for an unknown name.
pub fn dataset_schema(name: &str) -> Option<Vec<ColumnSchema>> {
    let schema = match name {
        TRANSACTIONS => vec![
            text("state_name"),
            int("year"),
            int("quarter"),
            int("total_transactions"),
            number("total_amount"),
        ],
        DEVICES => vec![
            text("brand"),
            int("total_registered_users"),
            number("avg_percentage_usage"),
        ],
        INSURANCE => vec![
            text("state_name"),
            int("year"),
            int("quarter"),
            int("total_policies_sold"),
            number("total_value"),
        ],
        GROWTH => vec![
            text("state_name"),
            number("previous_tx"),
            number("current_tx"),
            number("growth"),
            number("growth_percent"),
        ],
        ENGAGEMENT => vec![
            text("state_name"),
            int("total_registered_users"),
            int("total_app_opens"),
        ],
        CATEGORY_TRENDS => vec![text("category_name"), int("year"), number("amount")],
        _ => return None,
    };
    Some(schema)
}

/// Loads one dataset from CSV under its declared schema.
pub fn load_dataset<R: io::Read>(name: &str, reader: R) -> Result<Table, LoadError> {
    let schema =
        dataset_schema(name).ok_or_else(|| LoadError::UnknownDataset(name.to_string()))?;
    Ok(read_table(name, schema, reader, &CsvOptions::default())?)
}

fn text(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Text)
}

fn int(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Int)
}

fn number(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Number)
}
