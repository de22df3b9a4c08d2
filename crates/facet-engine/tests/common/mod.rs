#![allow(dead_code)]

use facet_engine::DatasetRegistry;
use facet_model::{ColumnSchema, ColumnType, Scalar, Table};

pub fn text_col(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Text)
}

pub fn int_col(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Int)
}

pub fn num_col(name: &str) -> ColumnSchema {
    ColumnSchema::new(name, ColumnType::Number)
}

pub fn registry_with(tables: Vec<Table>) -> DatasetRegistry {
    let mut registry = DatasetRegistry::new();
    for table in tables {
        registry.register(table).unwrap();
    }
    registry
}

/// All values of one column, in row order.
pub fn column_values(table: &Table, column: &str) -> Vec<Scalar> {
    let position = table.column_position(column).unwrap();
    table.rows().iter().map(|row| row[position].clone()).collect()
}
