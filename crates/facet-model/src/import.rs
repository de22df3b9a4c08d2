//! CSV ingestion for declared table schemas.
//!
//! No type inference happens here: the caller declares a [`ColumnSchema`]
//! list and the reader maps CSV columns to it by header name, parsing each
//! cell to the declared type. Extra CSV columns are ignored; a declared
//! column missing from the header is an error. Cells that are empty or do
//! not parse load as `Null` and are caught later by whatever consumes the
//! table, not by the importer.

use std::io;

use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder};
use thiserror::Error;

use crate::table::{ColumnSchema, ColumnType, Table, TableError};
use crate::value::Scalar;

#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions { delimiter: b',' }
    }
}

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("csv input for {table} has no header row")]
    EmptyInput { table: String },
    #[error("csv header for {table} is missing column {column}")]
    MissingColumn { table: String, column: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Reads CSV from `reader` into a [`Table`] named `name` with the given
/// schema. The first record is the header; declared columns are located in
/// it by exact name.
pub fn read_table<R: io::Read>(
    name: &str,
    schema: Vec<ColumnSchema>,
    reader: R,
    options: &CsvOptions,
) -> Result<Table, CsvImportError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let mut record = ByteRecord::new();
    if !csv_reader.read_byte_record(&mut record)? {
        return Err(CsvImportError::EmptyInput {
            table: name.to_string(),
        });
    }

    let header: Vec<String> = record
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = if idx == 0 { strip_bom(field) } else { field };
            String::from_utf8_lossy(field).trim().to_string()
        })
        .collect();

    let positions = schema
        .iter()
        .map(|column| {
            header
                .iter()
                .position(|h| h == &column.name)
                .ok_or_else(|| CsvImportError::MissingColumn {
                    table: name.to_string(),
                    column: column.name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = Table::new(name, schema)?;
    while csv_reader.read_byte_record(&mut record)? {
        let row = table
            .schema()
            .iter()
            .zip(&positions)
            .map(|(column, pos)| parse_cell(record.get(*pos), column.column_type))
            .collect();
        table.push_row(row)?;
    }
    Ok(table)
}

fn strip_bom(field: &[u8]) -> &[u8] {
    field.strip_prefix(b"\xef\xbb\xbf").unwrap_or(field)
}

fn parse_cell(field: Option<&[u8]>, column_type: ColumnType) -> Scalar {
    let Some(field) = field else {
        return Scalar::Null;
    };
    let text = String::from_utf8_lossy(field);
    let text = text.trim();
    if text.is_empty() {
        return Scalar::Null;
    }
    match column_type {
        ColumnType::Int => match text.parse::<i64>() {
            Ok(i) => Scalar::Int(i),
            // Whole-valued float spellings like "2023.0" still land as ints.
            Err(_) => match text.parse::<f64>() {
                Ok(n) if n == n.trunc() && n.abs() < 1e15 => Scalar::Int(n as i64),
                _ => Scalar::Null,
            },
        },
        ColumnType::Number => text
            .parse::<f64>()
            .map(Scalar::Number)
            .unwrap_or(Scalar::Null),
        ColumnType::Text => Scalar::Text(text.to_string()),
        ColumnType::Date => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Scalar::Date)
            .unwrap_or(Scalar::Null),
    }
}
