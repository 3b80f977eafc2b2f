//! Financial Modeling Prep API client

use crate::api::MarketDataProvider;
use crate::api::models::{HistoricalPrice, HistoricalResponse, IncomeStatement, QuoteRecord};
use crate::config::{API_KEY_ENV, StockConfig, retry_backoff};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const PROVIDER: &str = "Financial Modeling Prep";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Financial Modeling Prep API client
#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    max_retries: u32,
    retry_backoff_base: Duration,
}

impl fmt::Debug for FmpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FmpClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl FmpClient {
    /// Create a client from a validated configuration
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            rate_limiter: Arc::new(RateLimiter::direct(per_minute(
                config.rate_limit_per_minute,
            ))),
            max_retries: config.max_retries,
            retry_backoff_base: config.retry_backoff_base,
        })
    }

    /// Create from the `FMP_API_KEY` environment variable with default settings
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            StockError::ConfigError(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        let config = StockConfig::builder().fmp_api_key(api_key).build()?;
        Self::from_config(&config)
    }

    /// Latest quote for a symbol
    pub async fn get_quote(&self, symbol: &str) -> Result<QuoteRecord> {
        let data = self.get_json(&format!("quote/{symbol}"), &[]).await?;
        parse_quote(symbol, data)
    }

    /// Income statements, newest first
    pub async fn get_income_statements(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<IncomeStatement>> {
        let data = self
            .get_json(
                &format!("income-statement/{symbol}"),
                &[("limit", limit.to_string())],
            )
            .await?;
        parse_income_statements(data)
    }

    /// Daily closes, newest first
    pub async fn get_price_history(
        &self,
        symbol: &str,
        days: usize,
    ) -> Result<Vec<HistoricalPrice>> {
        let data = self
            .get_json(
                &format!("historical-price-full/{symbol}"),
                &[("timeseries", days.to_string())],
            )
            .await?;
        parse_price_history(data)
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            self.rate_limiter.until_ready().await;
            debug!(%url, attempt, "Requesting FMP endpoint");

            match self.send_once(&url, query).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let backoff = retry_backoff(self.retry_backoff_base, attempt);
                    warn!(
                        error = %e,
                        retry = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "Transient FMP failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn send_once(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .query(&[("apikey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StockError::RateLimitExceeded {
                provider: PROVIDER.to_string(),
            });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StockError::ConfigError(format!(
                "{PROVIDER} rejected the API key (HTTP {status})"
            )));
        }
        if status.is_server_error() {
            return Err(StockError::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            return Err(StockError::ApiError(format!("HTTP error: {status}")));
        }

        let data: Value = response.json().await?;
        check_api_error(&data)?;
        Ok(data)
    }
}

#[async_trait]
impl MarketDataProvider for FmpClient {
    async fn quote(&self, symbol: &str) -> Result<QuoteRecord> {
        self.get_quote(symbol).await
    }

    async fn income_statements(&self, symbol: &str, limit: usize) -> Result<Vec<IncomeStatement>> {
        self.get_income_statements(symbol, limit).await
    }

    async fn price_history(&self, symbol: &str, days: usize) -> Result<Vec<HistoricalPrice>> {
        self.get_price_history(symbol, days).await
    }
}

fn per_minute(rate_limit: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN))
}

/// Map an FMP error body to a typed error
///
/// FMP answers bad keys and exhausted plans with HTTP 200 and an
/// `"Error Message"` object.
pub fn check_api_error(data: &Value) -> Result<()> {
    let Some(message) = data.get("Error Message") else {
        return Ok(());
    };
    let message = message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string());

    if message.contains("Limit Reach") {
        return Err(StockError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }
    if message.contains("API KEY") || message.contains("apikey") {
        return Err(StockError::ConfigError(message));
    }
    Err(StockError::ApiError(message))
}

/// First record of a `/quote` response
pub fn parse_quote(symbol: &str, data: Value) -> Result<QuoteRecord> {
    let records: Vec<QuoteRecord> = serde_json::from_value(data)?;
    records
        .into_iter()
        .next()
        .ok_or_else(|| StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "no quote returned".to_string(),
        })
}

pub fn parse_income_statements(data: Value) -> Result<Vec<IncomeStatement>> {
    Ok(serde_json::from_value(data)?)
}

/// Closes from a `/historical-price-full` response; unknown symbols yield `{}`
pub fn parse_price_history(data: Value) -> Result<Vec<HistoricalPrice>> {
    let response: HistoricalResponse = serde_json::from_value(data)?;
    Ok(response.historical)
}
