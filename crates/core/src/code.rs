use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// UStVA Kennziffer a transaction is filed under.
///
/// Variant order is the lexical order of the string form, so sorting by the
/// enum and sorting by `as_str()` agree: `35 < 66 < 81 < unbekannt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReportingCode {
    /// Tax-exempt turnover.
    #[serde(rename = "35")]
    Kz35,
    /// Turnover at the standard rate (19 %).
    #[serde(rename = "66")]
    Kz66,
    /// Turnover at the reduced rate (7 %).
    #[serde(rename = "81")]
    Kz81,
    /// No rule matched the rate label.
    #[serde(rename = "unbekannt")]
    Unbekannt,
}

impl ReportingCode {
    pub const ALL: [ReportingCode; 4] = [
        ReportingCode::Kz35,
        ReportingCode::Kz66,
        ReportingCode::Kz81,
        ReportingCode::Unbekannt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportingCode::Kz35 => "35",
            ReportingCode::Kz66 => "66",
            ReportingCode::Kz81 => "81",
            ReportingCode::Unbekannt => "unbekannt",
        }
    }

    pub fn is_known(self) -> bool {
        self != ReportingCode::Unbekannt
    }
}

impl fmt::Display for ReportingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown reporting code: '{0}'")]
pub struct UnknownCode(pub String);

impl FromStr for ReportingCode {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportingCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownCode(s.to_string()))
    }
}
