use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use ustva_import::ImportOptions;
use ustva_report::docx::DOCX_FILE_NAME;

use crate::classify::{RateClassifier, RateRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Rule '{0}' targets 'unbekannt'; that code is only the fallback")]
    FallbackRule(String),
    #[error("Rule set is empty; every record would be 'unbekannt'")]
    NoRules,
}

/// Run settings, read from `ustva.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub import: ImportOptions,
    pub report: ReportConfig,
    pub classification: ClassificationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            file_name: DOCX_FILE_NAME.to_string(),
        }
    }
}

/// Extra rate labels on top of the statutory table, e.g. `"19 %"` written
/// with a space by some bookkeeping exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub replace_defaults: bool,
    pub rules: Vec<RateRule>,
}

impl ClassificationConfig {
    pub fn classifier(&self) -> RateClassifier {
        if self.replace_defaults {
            RateClassifier::new(self.rules.clone())
        } else {
            RateClassifier::with_extra_rules(self.rules.clone())
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), rules = config.classification.rules.len(), "config loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rule) = self
            .classification
            .rules
            .iter()
            .find(|r| !r.code.is_known())
        {
            return Err(ConfigError::FallbackRule(rule.label.clone()));
        }
        if self.classification.replace_defaults && self.classification.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        Ok(())
    }
}
