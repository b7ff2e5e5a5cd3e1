//! Outcome types shared by the validator and the handlers that call it.

use serde::{Deserialize, Serialize};

/// What to do when the fix budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailMode {
    /// Raise `ValidationExhausted`.
    Hard,
    /// Log a warning and continue as if the document passed.
    Soft,
}

impl FailMode {
    pub fn from_soft(soft: bool) -> Self {
        if soft { FailMode::Soft } else { FailMode::Hard }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    Pass,
    SoftPass,
    /// Validation is disabled in configuration.
    Skipped,
}

/// Terminal state of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Path relative to the project root
    pub path: String,
    pub status: ValidationStatus,
    /// Number of checker invocations
    pub checks: u32,
    /// Number of fix rewrites applied
    pub fixes: u32,
}

impl ValidationReport {
    pub fn skipped(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: ValidationStatus::Skipped,
            checks: 0,
            fixes: 0,
        }
    }
}
