use serde::{Deserialize, Serialize};
use ustva_core::{Cell, ReportingCode, SchemaError, Table};

/// Column holding the tax-rate label.
pub const RATE_COLUMN: &str = "Steuersatz";
/// Column added by classification.
pub const CODE_COLUMN: &str = "USt-KZ";

/// Statutory rate table, in priority order.
const STATUTORY_RULES: [(&str, ReportingCode); 3] = [
    ("19%", ReportingCode::Kz66),
    ("7%", ReportingCode::Kz81),
    ("steuerfrei", ReportingCode::Kz35),
];

/// Classify a rate label with the statutory rule table. Anything that is
/// not exactly one of the known labels, including a missing value, is
/// `unbekannt`.
pub fn classify(rate: Option<&str>) -> ReportingCode {
    rate.and_then(|label| {
        STATUTORY_RULES
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, code)| *code)
    })
    .unwrap_or(ReportingCode::Unbekannt)
}

/// Maps one exact rate label to a reporting code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRule {
    pub label: String,
    pub code: ReportingCode,
}

impl RateRule {
    pub fn new(label: &str, code: ReportingCode) -> Self {
        Self {
            label: label.to_string(),
            code,
        }
    }

    fn matches(&self, rate: &Cell) -> bool {
        rate.as_text() == Some(self.label.as_str())
    }
}

/// A table with its reporting code column attached.
///
/// `codes[i]` is the code of `table.rows()[i]`; the same value is also
/// present as text in the `USt-KZ` column for display and reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTable {
    table: Table,
    codes: Vec<ReportingCode>,
}

impl ClassifiedTable {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn codes(&self) -> &[ReportingCode] {
        &self.codes
    }

    pub fn into_table(self) -> Table {
        self.table
    }
}

/// Ordered rule list; the first matching rule wins and `unbekannt` is the
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateClassifier {
    rules: Vec<RateRule>,
}

impl Default for RateClassifier {
    fn default() -> Self {
        Self::statutory()
    }
}

impl RateClassifier {
    pub fn new(rules: Vec<RateRule>) -> Self {
        Self { rules }
    }

    pub fn statutory() -> Self {
        Self::new(
            STATUTORY_RULES
                .iter()
                .map(|(label, code)| RateRule::new(label, *code))
                .collect(),
        )
    }

    /// Statutory rules followed by `extra`, so statutory labels keep
    /// priority.
    pub fn with_extra_rules(extra: Vec<RateRule>) -> Self {
        let mut classifier = Self::statutory();
        classifier.rules.extend(extra);
        classifier
    }

    pub fn rules(&self) -> &[RateRule] {
        &self.rules
    }

    pub fn classify(&self, rate: &Cell) -> ReportingCode {
        self.rules
            .iter()
            .find(|rule| rule.matches(rate))
            .map_or(ReportingCode::Unbekannt, |rule| rule.code)
    }

    /// Attach a `USt-KZ` column to every row. Fails before touching any row
    /// if `Steuersatz` is missing or `USt-KZ` already exists.
    pub fn classify_table(&self, table: Table) -> Result<ClassifiedTable, SchemaError> {
        let rate_idx = table.require_column(RATE_COLUMN)?;
        if table.has_column(CODE_COLUMN) {
            return Err(SchemaError::ColumnExists(CODE_COLUMN.to_string()));
        }

        let codes: Vec<ReportingCode> = table
            .rows()
            .iter()
            .map(|row| self.classify(&row[rate_idx]))
            .collect();

        let unknown = codes.iter().filter(|c| !c.is_known()).count();
        tracing::debug!(rows = codes.len(), unknown, "records classified");

        let cells = codes.iter().map(|c| Cell::text(c.as_str())).collect();
        let table = table.with_column(CODE_COLUMN, cells)?;
        Ok(ClassifiedTable { table, codes })
    }
}
