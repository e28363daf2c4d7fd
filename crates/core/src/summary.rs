use serde::{Deserialize, Serialize};

use crate::code::ReportingCode;
use crate::money::Money;

/// Sum of all amounts filed under one reporting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub code: ReportingCode,
    pub total: Money,
    pub count: usize,
}

impl AggregateRow {
    /// The report line for this row, e.g. `Kennziffer 66: 100.00 EUR`.
    pub fn report_line(&self) -> String {
        format!("Kennziffer {}: {}", self.code, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_line_format() {
        let row = AggregateRow {
            code: ReportingCode::Kz66,
            total: Money::from_cents(10_000),
            count: 1,
        };
        assert_eq!(row.report_line(), "Kennziffer 66: 100.00 EUR");

        let row = AggregateRow {
            code: ReportingCode::Unbekannt,
            total: Money::from_cents(-505),
            count: 2,
        };
        assert_eq!(row.report_line(), "Kennziffer unbekannt: -5.05 EUR");
    }
}
