//! Market-data provider seam and the Financial Modeling Prep client

pub mod fmp;
pub mod models;

pub use fmp::FmpClient;
pub use models::{HistoricalPrice, IncomeStatement, QuoteRecord};

use crate::error::Result;
use async_trait::async_trait;

/// Source of quotes, income statements and daily closes
///
/// The analyzer only talks to this trait, so tests can swap in a mock and
/// the cache can wrap any implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Latest quote for `symbol`
    async fn quote(&self, symbol: &str) -> Result<QuoteRecord>;

    /// Most recent income statements, newest first
    async fn income_statements(&self, symbol: &str, limit: usize) -> Result<Vec<IncomeStatement>>;

    /// Daily closes for the last `days` sessions, newest first
    async fn price_history(&self, symbol: &str, days: usize) -> Result<Vec<HistoricalPrice>>;
}
