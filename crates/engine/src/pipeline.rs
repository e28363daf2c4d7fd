use std::fmt;
use std::path::Path;
use thiserror::Error;
use ustva_core::{AggregateRow, Money, SchemaError, Table};
use ustva_import::{load_table, ImportError};
use ustva_report::Report;

use crate::aggregate::{aggregate, grand_total, AggregateError};
use crate::classify::{ClassifiedTable, RateClassifier};
use crate::config::PipelineConfig;
use crate::reconcile::{reconcile, Reconciliation, JOIN_KEY};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
}

/// Something the user should know about that did not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    NoCommonKey { common_columns: Vec<String> },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::NoCommonKey { .. } => write!(
                f,
                "Kein gemeinsames Feld für Abgleich gefunden (z. B. '{JOIN_KEY}')"
            ),
        }
    }
}

/// Everything one run produced. The presentation side reads the tables and
/// rows directly; `report` is ready for a [`ustva_report::ReportWriter`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub classified: ClassifiedTable,
    pub aggregates: Vec<AggregateRow>,
    pub total: Money,
    pub reconciliation: Option<Reconciliation>,
    pub advisories: Vec<Advisory>,
    pub report: Report,
}

/// Classify → aggregate → reconcile → build report.
///
/// Holds only configuration; every run starts from the tables it is given
/// and shares nothing with other runs.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
    classifier: RateClassifier,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let classifier = config.classification.classifier();
        Self { config, classifier }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load both files first, then run. A broken secondary file fails the
    /// run before any classification happens.
    pub fn run_files(
        &self,
        primary: &Path,
        secondary: Option<&Path>,
    ) -> Result<RunOutcome, PipelineError> {
        let primary = load_table(primary, &self.config.import)?;
        let secondary = secondary
            .map(|path| load_table(path, &self.config.import))
            .transpose()?;
        self.run(primary, secondary.as_ref())
    }

    pub fn run(
        &self,
        primary: Table,
        secondary: Option<&Table>,
    ) -> Result<RunOutcome, PipelineError> {
        tracing::info!(
            rows = primary.len(),
            secondary_rows = ?secondary.map(Table::len),
            "pipeline started"
        );

        let classified = self.classifier.classify_table(primary)?;
        let aggregates = aggregate(&classified)?;
        let total = grand_total(&aggregates)?;
        tracing::debug!(%total, "grand total computed");

        let mut advisories = Vec::new();
        let reconciliation = match secondary {
            Some(secondary) => {
                let result = reconcile(classified.table(), secondary)?;
                if let Reconciliation::NoCommonKey { common_columns } = &result {
                    advisories.push(Advisory::NoCommonKey {
                        common_columns: common_columns.clone(),
                    });
                }
                Some(result)
            }
            None => None,
        };

        let matched = reconciliation.as_ref().and_then(Reconciliation::match_count);
        let report = Report::build(&aggregates, matched);

        Ok(RunOutcome {
            classified,
            aggregates,
            total,
            reconciliation,
            advisories,
            report,
        })
    }
}
