use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;
use ustva_core::{AggregateRow, Cell, Money, ReportingCode, SchemaError};

use crate::classify::ClassifiedTable;

/// Column holding the booking amount.
pub const AMOUNT_COLUMN: &str = "Betrag";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Row {row}: {column} is not a number: '{value}'")]
    InvalidAmount {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Row {row}: sum of {column} exceeds the representable range")]
    Overflow { row: usize, column: String },
    #[error("Grand total exceeds the representable range")]
    TotalOverflow,
}

/// Sum `Betrag` per reporting code.
///
/// Rows come back ordered by code (`35`, `66`, `81`, `unbekannt`), one per
/// code that occurs. Any amount that is not a number aborts the whole
/// aggregation; there is no partial result.
pub fn aggregate(classified: &ClassifiedTable) -> Result<Vec<AggregateRow>, AggregateError> {
    let table = classified.table();
    let amount_idx = table.require_column(AMOUNT_COLUMN)?;

    let mut groups: BTreeMap<ReportingCode, (Money, usize)> = BTreeMap::new();

    for (idx, (row, code)) in table.rows().iter().zip(classified.codes()).enumerate() {
        let cell = &row[amount_idx];
        let amount = parse_amount(cell).ok_or_else(|| AggregateError::InvalidAmount {
            row: idx + 1,
            column: AMOUNT_COLUMN.to_string(),
            value: cell.to_string(),
        })?;
        let entry = groups.entry(*code).or_insert((Money::zero(), 0));
        entry.0 = entry
            .0
            .checked_add(Money::new(amount))
            .ok_or_else(|| AggregateError::Overflow {
                row: idx + 1,
                column: AMOUNT_COLUMN.to_string(),
            })?;
        entry.1 += 1;
    }

    let rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(code, (total, count))| AggregateRow { code, total, count })
        .collect();

    tracing::info!(codes = rows.len(), "amounts aggregated");
    Ok(rows)
}

/// Sum over all aggregate rows; equals the sum of every input amount.
/// Per-code totals that fit on their own can still overflow together.
pub fn grand_total(rows: &[AggregateRow]) -> Result<Money, AggregateError> {
    rows.iter()
        .try_fold(Money::zero(), |acc, r| acc.checked_add(r.total))
        .ok_or(AggregateError::TotalOverflow)
}

/// Numeric cells are taken as-is; text is accepted when it is a plain
/// number apart from surrounding whitespace.
fn parse_amount(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Integer(n) => Some(Decimal::from(*n)),
        Cell::Decimal(d) => Some(*d),
        Cell::Text(s) => match Cell::infer(s.trim()) {
            Cell::Integer(n) => Some(Decimal::from(n)),
            Cell::Decimal(d) => Some(d),
            _ => None,
        },
        Cell::Empty | Cell::Bool(_) => None,
    }
}
