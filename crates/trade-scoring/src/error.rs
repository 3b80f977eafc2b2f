//! Error types for the scoring pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for scoring operations
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Conditions the scoring pipeline can hit
///
/// `InvalidRange` and `MissingData` are recovered inside
/// [`ScoringEngine::evaluate`](crate::ScoringEngine::evaluate): the result is
/// forced to Hold and the affected metrics are reported as NaN.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ScoringError {
    /// A price level or derived distance is outside the range the formula accepts
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A required numeric field was absent from the upstream payload
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScoringError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingData(format!("{field} is not available"))
    }

    /// Whether the pipeline recovers from this condition instead of failing
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidRange(_) | Self::MissingData(_))
    }
}
