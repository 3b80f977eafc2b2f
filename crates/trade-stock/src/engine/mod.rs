//! Trade analysis engine
//!
//! Fetches market data through a [`MarketDataProvider`](crate::api::MarketDataProvider)
//! and runs it through the scoring pipeline.

pub mod analyzer;
pub mod result;

pub use analyzer::TradeAnalyzer;
pub use result::{BatchEntry, BatchReport, MarketSnapshot, TradeReport, TradeRequest};
