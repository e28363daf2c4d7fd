use thiserror::Error;
use ustva_core::{Cell, SchemaError, Table};

use crate::util::{decode_text, sniff_delimiter};

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(char),
    #[error("No header row")]
    NoHeader,
    #[error("Line {line}: expected {expected} fields, found {found}")]
    TooManyFields {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Parse delimiter-separated text into a [`Table`].
///
/// The first non-blank record is the header. Blank records are skipped,
/// short records are padded with empty cells, and records longer than the
/// header are rejected. Without an explicit `delimiter` one is sniffed from
/// the first lines.
pub fn read_delimited(data: &[u8], delimiter: Option<u8>) -> Result<Table, CsvError> {
    let text = decode_text(data);
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&text));
    tracing::debug!(delimiter = %char::from(delimiter).escape_default(), "parsing delimited text");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header = loop {
        match records.next() {
            Some(result) => {
                let record = result?;
                if !is_blank(&record) {
                    break record;
                }
            }
            None => return Err(CsvError::NoHeader),
        }
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, name)| column_name(idx, name))
        .collect();
    let mut table = Table::new(columns)?;
    let width = table.columns().len();

    for result in records {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        if record.len() > width {
            return Err(CsvError::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<Cell> = record.iter().map(Cell::infer).collect();
        row.resize(width, Cell::Empty);
        table.push_row(row)?;
    }

    Ok(table)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Headers are taken verbatim; only a missing name gets a positional
/// placeholder.
pub(crate) fn column_name(idx: usize, name: &str) -> String {
    if name.is_empty() {
        format!("Unnamed: {idx}")
    } else {
        name.to_string()
    }
}
