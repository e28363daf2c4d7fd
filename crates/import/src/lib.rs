pub mod csv;
pub mod spreadsheet;
pub(crate) mod util;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use ustva_core::Table;

pub use crate::csv::CsvError;
pub use crate::spreadsheet::SpreadsheetError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported file type: {0} (expected .csv, .txt, .tsv, .xlsx, .xlsm, .xlsb, .xls or .ods)")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),
}

/// How a source file is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match ext.as_str() {
            "csv" | "txt" | "tsv" => Ok(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Per-run knobs for the readers. Everything is optional; the defaults
/// sniff the delimiter and read the first worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub delimiter: Option<char>,
    pub sheet: Option<String>,
}

/// Read a table from raw bytes, e.g. an uploaded file already held in memory.
pub fn read_table(
    data: &[u8],
    format: SourceFormat,
    options: &ImportOptions,
) -> Result<Table, ImportError> {
    let table = match format {
        SourceFormat::Delimited => {
            let delimiter = options.delimiter.map(delimiter_byte).transpose()?;
            crate::csv::read_delimited(data, delimiter)?
        }
        SourceFormat::Spreadsheet => {
            crate::spreadsheet::read_workbook(data, options.sheet.as_deref())?
        }
    };
    tracing::debug!(
        columns = table.columns().len(),
        rows = table.len(),
        "table loaded"
    );
    Ok(table)
}

/// Read a table from a file, choosing the reader by file extension.
pub fn load_table(path: &Path, options: &ImportOptions) -> Result<Table, ImportError> {
    let format = SourceFormat::from_path(path)?;
    let data = std::fs::read(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?format, bytes = data.len(), "reading input");
    read_table(&data, format, options)
}

fn delimiter_byte(c: char) -> Result<u8, ImportError> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(ImportError::Csv(CsvError::InvalidDelimiter(c)))
}
