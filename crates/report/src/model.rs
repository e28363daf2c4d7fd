use serde::Serialize;
use ustva_core::AggregateRow;

pub const REPORT_TITLE: &str = "Umsatzsteuervoranmeldung – Zusammenfassung";
pub const AGGREGATE_HEADING: &str = "Summen je USt-Kennziffer";
pub const RECONCILIATION_HEADING: &str = "Abgleich mit Zusatzdatei";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
}

/// The summary document of one run. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    title: String,
    sections: Vec<Section>,
}

impl Report {
    /// `matched` is the reconciled record count, or `None` when no
    /// reconciliation took place (no secondary data, or no common key).
    /// `None` omits the section entirely; `Some(0)` still emits it.
    pub fn build(aggregates: &[AggregateRow], matched: Option<usize>) -> Report {
        let mut sections = vec![Section {
            heading: AGGREGATE_HEADING.to_string(),
            lines: aggregates.iter().map(AggregateRow::report_line).collect(),
        }];

        if let Some(count) = matched {
            sections.push(Section {
                heading: RECONCILIATION_HEADING.to_string(),
                lines: vec![format!("Übereinstimmende Belegnummern: {count}")],
            });
        }

        Report {
            title: REPORT_TITLE.to_string(),
            sections,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn has_reconciliation(&self) -> bool {
        self.sections
            .iter()
            .any(|s| s.heading == RECONCILIATION_HEADING)
    }
}
