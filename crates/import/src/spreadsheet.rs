use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::io::Cursor;
use thiserror::Error;
use ustva_core::{Cell, SchemaError, Table};

use crate::csv::column_name;

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Workbook has no worksheets")]
    NoWorksheet,
    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),
    #[error("Worksheet '{0}' has no header row")]
    NoHeader(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Read one worksheet of an xlsx/xls/ods workbook into a [`Table`].
///
/// Uses `sheet` when given, otherwise the first worksheet. The first
/// non-empty row is the header; fully empty rows are skipped.
pub fn read_workbook(data: &[u8], sheet: Option<&str>) -> Result<Table, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;
    let sheet_names = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) if sheet_names.iter().any(|s| s == name) => name.to_string(),
        Some(name) => return Err(SpreadsheetError::SheetNotFound(name.to_string())),
        None => sheet_names
            .first()
            .cloned()
            .ok_or(SpreadsheetError::NoWorksheet)?,
    };
    tracing::debug!(sheet = %sheet_name, "reading worksheet");

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows().filter(|row| !row.iter().all(is_blank));

    let header = rows
        .next()
        .ok_or_else(|| SpreadsheetError::NoHeader(sheet_name.clone()))?;
    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, data)| column_name(idx, &data.to_string()))
        .collect();
    let mut table = Table::new(columns)?;

    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect())?;
    }

    Ok(table)
}

fn is_blank(data: &Data) -> bool {
    match data {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Integral floats become integers, matching how spreadsheet tools expose
/// whole numbers (a voucher number typed as `3` is stored as `3.0`).
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(n) => Cell::Integer(*n),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn float_cell(f: f64) -> Cell {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Cell::Integer(f as i64);
    }
    match Decimal::from_f64(f) {
        Some(d) => Cell::Decimal(d),
        None => Cell::Text(f.to_string()),
    }
}
