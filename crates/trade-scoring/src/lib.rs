//! Trade scoring pipeline
//!
//! Turns a quote, two periods of fundamentals and a user's target/stop-loss
//! into a Buy/Hold/Sell recommendation:
//!
//! - **Technical chance**: `reward / (reward + risk)` from the trade levels
//! - **Fundamental score**: revenue growth and profit margin folded into [0, 1]
//! - **Composite chance**: weighted blend of the two (70/30 by default)
//! - **Expectancy**: `c * reward - (1 - c) * risk`
//! - **Decision**: threshold rule over composite chance and expectancy
//!
//! A separate rule sequence over moving averages, market cap and the day's
//! range produces the technical recommendation.
//!
//! Everything here is pure and synchronous. Bad inputs never panic or
//! propagate: they are recorded on the result and the decision falls back to
//! Hold.
//!
//! # Example
//!
//! ```
//! use trade_scoring::{
//!     AnalysisInput, FundamentalInputs, Fundamentals, QuoteFields, Recommendation,
//!     ScoringEngine, TradeParameters,
//! };
//!
//! let input = AnalysisInput {
//!     quote: QuoteFields {
//!         price: Some(175.0),
//!         day_high: Some(177.0),
//!         day_low: Some(173.0),
//!         price_avg_50: Some(170.0),
//!         price_avg_200: Some(165.0),
//!         market_cap: Some(2.7e12),
//!     },
//!     fundamentals: Fundamentals::Reported(FundamentalInputs::new(0.9, 0.7)),
//!     params: TradeParameters::new(185.0, 170.0),
//! };
//!
//! let result = ScoringEngine::default().evaluate(&input);
//! assert_eq!(result.final_decision, Recommendation::Buy);
//! ```

pub mod composite;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod fundamental;
pub mod signals;
pub mod technical;
pub mod types;

pub use composite::{composite_chance, expectancy};
pub use config::{CompositeWeights, DecisionThresholds, ScoringConfig, TechnicalRules};
pub use decision::decide;
pub use engine::ScoringEngine;
pub use error::{Result, ScoringError};
pub use fundamental::{
    FundamentalBasis, FundamentalInputs, Fundamentals, PeriodFigures, fundamental_score,
};
pub use signals::{TechnicalSignal, technical_recommendation};
pub use technical::{PriceDistances, technical_chance};
pub use types::{AnalysisInput, AnalysisResult, Quote, QuoteFields, Recommendation, TradeParameters};
