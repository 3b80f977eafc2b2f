//! Market data and trade analysis for trade-check
//!
//! This crate connects the scoring pipeline in `trade-scoring` to live data:
//!
//! - Financial Modeling Prep client with rate limiting and retries
//! - TTL caching of quotes, income statements and price history
//! - Moving averages computed locally when the quote omits them
//! - Ticker validation
//! - Text, table and JSON report formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use trade_stock::{CachedProvider, FmpClient, StockConfig, TradeAnalyzer};
//! use trade_scoring::TradeParameters;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env_api_key().build()?;
//!     let provider = CachedProvider::from_config(FmpClient::from_config(&config)?, &config);
//!     let analyzer = TradeAnalyzer::from_config(provider, &config)?;
//!
//!     let report = analyzer
//!         .analyze("AAPL", TradeParameters::new(185.0, 170.0))
//!         .await?;
//!     println!("{}", report.analysis.final_decision);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod report;
pub mod symbol;

pub use api::{FmpClient, HistoricalPrice, IncomeStatement, MarketDataProvider, QuoteRecord};
pub use cache::{CacheKey, CacheManager, CachedProvider, StockCache};
pub use config::{StockConfig, StockConfigBuilder};
pub use engine::{BatchEntry, BatchReport, MarketSnapshot, TradeAnalyzer, TradeReport, TradeRequest};
pub use error::{Result, StockError};
pub use report::{FormatterFactory, JsonFormatter, ReportFormat, ReportFormatter, TextFormatter};
pub use symbol::normalize_symbol;
