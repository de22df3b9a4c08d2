//! In-memory tables with a declared column schema.
//!
//! A [`Table`] is row-major: a header of [`ColumnSchema`] entries plus a
//! `Vec` of rows, each row a `Vec<Scalar>` matching the header arity. Rows
//! are validated on the way in (arity and cell type), so everything
//! downstream can index cells without re-checking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Scalar;

/// Declared type of a column. `Null` is not a column type; any column may
/// hold nulls alongside values of its declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnType {
    Int,
    Number,
    Text,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Number => "number",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
        }
    }

    /// Whether `value` may be stored in a column of this type.
    pub fn admits(&self, value: &Scalar) -> bool {
        match (self, value) {
            (_, Scalar::Null) => true,
            (ColumnType::Int, Scalar::Int(_)) => true,
            (ColumnType::Number, Scalar::Number(_)) => true,
            // Int widens into a Number column without complaint.
            (ColumnType::Number, Scalar::Int(_)) => true,
            (ColumnType::Text, Scalar::Text(_)) => true,
            (ColumnType::Date, Scalar::Date(_)) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        ColumnSchema {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("duplicate column {table}[{column}]")]
    DuplicateColumn { table: String, column: String },
    #[error("unknown column {table}[{column}]")]
    UnknownColumn { table: String, column: String },
    #[error("row arity mismatch in {table}: expected {expected} cells, got {actual}")]
    RowArity {
        table: String,
        expected: usize,
        actual: usize,
    },
    #[error("type mismatch in {table}[{column}] row {row}: expected {expected:?}, got {found}")]
    CellType {
        table: String,
        column: String,
        row: usize,
        expected: ColumnType,
        found: &'static str,
    },
}

/// A named table of scalar rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    schema: Vec<ColumnSchema>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Creates an empty table, rejecting duplicate column names.
    pub fn new(name: impl Into<String>, schema: Vec<ColumnSchema>) -> Result<Self, TableError> {
        let name = name.into();
        let mut column_index = HashMap::with_capacity(schema.len());
        for (idx, column) in schema.iter().enumerate() {
            if column_index.insert(column.name.clone(), idx).is_some() {
                return Err(TableError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }
        Ok(Table {
            name,
            schema,
            column_index,
            rows: Vec::new(),
        })
    }

    /// Creates a table and loads `rows` through [`Table::push_row`].
    pub fn with_rows(
        name: impl Into<String>,
        schema: Vec<ColumnSchema>,
        rows: Vec<Vec<Scalar>>,
    ) -> Result<Self, TableError> {
        let mut table = Table::new(name, schema)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row, checking arity and per-cell types against the schema.
    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<(), TableError> {
        if row.len() != self.schema.len() {
            return Err(TableError::RowArity {
                table: self.name.clone(),
                expected: self.schema.len(),
                actual: row.len(),
            });
        }
        for (column, cell) in self.schema.iter().zip(&row) {
            if !column.column_type.admits(cell) {
                return Err(TableError::CellType {
                    table: self.name.clone(),
                    column: column.name.clone(),
                    row: self.rows.len(),
                    expected: column.column_type,
                    found: cell.kind_name(),
                });
            }
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_position(name)
            .map(|idx| self.schema[idx].column_type)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Scalar> {
        let idx = self.column_position(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// New table with the same name and schema, keeping rows that satisfy
    /// `keep`. Row order is preserved.
    pub fn filtered(&self, mut keep: impl FnMut(&[Scalar]) -> bool) -> Table {
        Table {
            name: self.name.clone(),
            schema: self.schema.clone(),
            column_index: self.column_index.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }
}
