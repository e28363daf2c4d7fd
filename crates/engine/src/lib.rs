pub mod aggregate;
pub mod classify;
pub mod config;
pub mod pipeline;
pub mod reconcile;

pub use aggregate::{aggregate, grand_total, AggregateError};
pub use classify::{classify, ClassifiedTable, RateClassifier, RateRule};
pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{Advisory, Pipeline, PipelineError, RunOutcome};
pub use reconcile::{reconcile, Reconciliation, JOIN_KEY};
