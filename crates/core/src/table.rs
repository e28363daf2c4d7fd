use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single typed value of a parsed table.
///
/// Equality is exact in both type and value: `Integer(1)` never equals
/// `Text("1")`, and text is compared byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Integer(i64),
    Decimal(Decimal),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Type inference for a raw text field: empty → `Empty`, whole numbers →
    /// `Integer`, plain decimals → `Decimal`, `true`/`false` → `Bool`,
    /// everything else stays `Text` untouched (no trimming).
    pub fn infer(raw: &str) -> Cell {
        if raw.is_empty() {
            return Cell::Empty;
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Cell::Integer(n);
        }
        if looks_numeric(raw) {
            if let Ok(d) = Decimal::from_str(raw) {
                return Cell::Decimal(d);
            }
            if let Ok(d) = Decimal::from_scientific(raw) {
                return Cell::Decimal(d);
            }
        }
        match raw {
            "True" | "TRUE" | "true" => Cell::Bool(true),
            "False" | "FALSE" | "false" => Cell::Bool(false),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn text(s: impl Into<String>) -> Cell {
        Cell::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn looks_numeric(raw: &str) -> bool {
    raw.bytes().any(|b| b.is_ascii_digit())
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Integer(n) => write!(f, "{n}"),
            Cell::Decimal(d) => write!(f, "{d}"),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Column already exists: {0}")]
    ColumnExists(String),
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("Row {row} has {found} fields, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// An in-memory table with named columns. Rows are positional; every row
/// has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Table {
            columns,
            rows: Vec::new(),
        })
    }

    /// Build a table from literal columns and rows; used heavily in tests.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<Cell>>,
    ) -> Result<Self, SchemaError> {
        let mut table = Table::new(columns.into_iter().map(Into::into).collect())?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), SchemaError> {
        if row.len() != self.columns.len() {
            return Err(SchemaError::RowWidth {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Append one column, consuming the table. `cells` must have one entry
    /// per row.
    pub fn with_column(mut self, name: &str, cells: Vec<Cell>) -> Result<Table, SchemaError> {
        if self.has_column(name) {
            return Err(SchemaError::ColumnExists(name.to_string()));
        }
        if cells.len() != self.rows.len() {
            return Err(SchemaError::RowWidth {
                row: cells.len().min(self.rows.len()) + 1,
                expected: self.rows.len(),
                found: cells.len(),
            });
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ── Cell::infer ───────────────────────────────────────────────────────────

    #[test]
    fn infer_integers_and_decimals() {
        assert_eq!(Cell::infer("42"), Cell::Integer(42));
        assert_eq!(Cell::infer("-7"), Cell::Integer(-7));
        assert_eq!(Cell::infer("100.50"), Cell::Decimal(dec("100.50")));
        assert_eq!(Cell::infer("1e3"), Cell::Decimal(dec("1000")));
    }

    #[test]
    fn infer_keeps_labels_as_text() {
        assert_eq!(Cell::infer("19%"), Cell::text("19%"));
        assert_eq!(Cell::infer("steuerfrei"), Cell::text("steuerfrei"));
        assert_eq!(Cell::infer(" 7%"), Cell::text(" 7%"));
        assert_eq!(Cell::infer("1_000"), Cell::text("1_000"));
        assert_eq!(Cell::infer("abc"), Cell::text("abc"));
    }

    #[test]
    fn infer_empty_and_bool() {
        assert_eq!(Cell::infer(""), Cell::Empty);
        assert_eq!(Cell::infer("True"), Cell::Bool(true));
        assert_eq!(Cell::infer("false"), Cell::Bool(false));
    }

    #[test]
    fn equality_is_type_exact() {
        assert_ne!(Cell::Integer(1), Cell::text("1"));
        assert_ne!(Cell::text("a"), Cell::text("A"));
        assert_eq!(Cell::Decimal(dec("1.0")), Cell::Decimal(dec("1.00")));
    }

    // ── Table ─────────────────────────────────────────────────────────────────

    #[test]
    fn new_rejects_duplicate_columns() {
        let err = Table::new(vec!["a".into(), "b".into(), "a".into()]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("a".into()));
    }

    #[test]
    fn push_row_checks_width() {
        let mut t = Table::new(vec!["a".into(), "b".into()]).unwrap();
        t.push_row(vec![Cell::Integer(1), Cell::Empty]).unwrap();
        let err = t.push_row(vec![Cell::Integer(1)]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::RowWidth {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn require_column_names_missing_column() {
        let t = Table::from_rows(["Betrag"], Vec::<Vec<Cell>>::new()).unwrap();
        assert_eq!(t.require_column("Betrag").unwrap(), 0);
        assert_eq!(
            t.require_column("Steuersatz"),
            Err(SchemaError::MissingColumn("Steuersatz".into()))
        );
    }

    #[test]
    fn with_column_appends_without_touching_existing() {
        let t = Table::from_rows(
            ["a"],
            vec![vec![Cell::Integer(1)], vec![Cell::Integer(2)]],
        )
        .unwrap();
        let t = t
            .with_column("b", vec![Cell::text("x"), Cell::text("y")])
            .unwrap();
        assert_eq!(t.columns(), ["a", "b"]);
        assert_eq!(t.rows()[1], vec![Cell::Integer(2), Cell::text("y")]);
    }

    #[test]
    fn with_column_refuses_to_overwrite() {
        let t = Table::from_rows(["a"], vec![vec![Cell::Integer(1)]]).unwrap();
        assert_eq!(
            t.with_column("a", vec![Cell::Empty]),
            Err(SchemaError::ColumnExists("a".into()))
        );
    }

    #[test]
    fn column_iterates_values() {
        let t = Table::from_rows(
            ["a", "b"],
            vec![
                vec![Cell::Integer(1), Cell::text("x")],
                vec![Cell::Integer(2), Cell::text("y")],
            ],
        )
        .unwrap();
        let b: Vec<&Cell> = t.column("b").unwrap().collect();
        assert_eq!(b, vec![&Cell::text("x"), &Cell::text("y")]);
        assert!(t.column("c").is_none());
    }
}
