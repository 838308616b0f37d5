//! Log severities and their 4-letter on-disk tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Routine status reporting.
    Info,
    /// Unexpected but tolerated conditions.
    Warn,
    /// Failures.
    Error,
}

impl Severity {
    /// The fixed-width tag written between brackets on disk.
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERRO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown severity tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity tag: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(Severity::Info),
            "WARN" => Ok(Severity::Warn),
            "ERRO" | "ERROR" => Ok(Severity::Error),
            other => Err(ParseSeverityError(other.to_string())),
        }
    }
}
