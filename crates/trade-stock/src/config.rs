//! Configuration for market-data fetching and analysis

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trade_scoring::ScoringConfig;

/// Environment variable holding the Financial Modeling Prep API key
pub const API_KEY_ENV: &str = "FMP_API_KEY";

/// Default Financial Modeling Prep endpoint
pub const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Shortest history that still yields a 200-day average
pub const MIN_HISTORY_DAYS: usize = 200;

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Financial Modeling Prep API key
    pub fmp_api_key: Option<String>,

    /// API base URL
    pub base_url: String,

    /// Maximum requests per minute
    pub rate_limit_per_minute: u32,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Retries after the first attempt for transient failures
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Cache TTL for quotes
    pub cache_ttl_realtime: Duration,

    /// Cache TTL for income statements and price history
    pub cache_ttl_fundamental: Duration,

    /// Daily closes to fetch when a moving average must be computed locally
    pub history_days: usize,

    /// Scoring weights and thresholds
    pub scoring: ScoringConfig,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            fmp_api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_per_minute: 60,
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            cache_ttl_realtime: Duration::from_secs(60),      // 1 minute
            cache_ttl_fundamental: Duration::from_secs(3600), // 1 hour
            history_days: MIN_HISTORY_DAYS,
            scoring: ScoringConfig::default(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// The API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.fmp_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StockError::ConfigError(format!(
                    "Financial Modeling Prep API key required (set {API_KEY_ENV} or pass --api-key)"
                ))
            })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit_per_minute == 0 {
            return Err(StockError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.history_days < MIN_HISTORY_DAYS {
            return Err(StockError::ConfigError(format!(
                "history_days must be at least {MIN_HISTORY_DAYS}"
            )));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(StockError::ConfigError(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }

        self.scoring.validate()?;
        Ok(())
    }
}

/// Delay before retry number `attempt + 1`: `base * 2^attempt`
pub fn retry_backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2_u32.saturating_pow(attempt))
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    fmp_api_key: Option<String>,
    base_url: Option<String>,
    rate_limit_per_minute: Option<u32>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    cache_ttl_realtime: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    history_days: Option<usize>,
    scoring: Option<ScoringConfig>,
}

impl StockConfigBuilder {
    /// Set the Financial Modeling Prep API key
    pub fn fmp_api_key(mut self, key: impl Into<String>) -> Self {
        self.fmp_api_key = Some(key.into());
        self
    }

    /// Load the API key from `FMP_API_KEY` if it is set
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.fmp_api_key = Some(key);
        }
        self
    }

    /// Override the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Set the request rate limit
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set cache TTL for quotes
    pub fn cache_ttl_realtime(mut self, duration: Duration) -> Self {
        self.cache_ttl_realtime = Some(duration);
        self
    }

    /// Set cache TTL for fundamentals and history
    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    /// Set the price-history window
    pub fn history_days(mut self, days: usize) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the scoring configuration
    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = Some(scoring);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            fmp_api_key: self.fmp_api_key.or(defaults.fmp_api_key),
            base_url: self.base_url.unwrap_or(defaults.base_url),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            cache_ttl_realtime: self.cache_ttl_realtime.unwrap_or(defaults.cache_ttl_realtime),
            cache_ttl_fundamental: self
                .cache_ttl_fundamental
                .unwrap_or(defaults.cache_ttl_fundamental),
            history_days: self.history_days.unwrap_or(defaults.history_days),
            scoring: self.scoring.unwrap_or(defaults.scoring),
        };

        config.validate()?;
        Ok(config)
    }
}
