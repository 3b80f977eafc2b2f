//! Error types for market-data and analysis operations

use thiserror::Error;
use trade_scoring::ScoringError;

/// Errors raised while fetching data or driving an analysis
#[derive(Debug, Error)]
pub enum StockError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Upstream answered with a 5xx status
    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Moving-average calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// User input could not be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Scoring pipeline rejected its configuration
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            StockError::RateLimitExceeded { .. } | StockError::ServerError(_) => true,
            StockError::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
