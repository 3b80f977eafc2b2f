//! Inputs and outputs of the scoring pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ScoringError};
use crate::fundamental::{FundamentalBasis, Fundamentals};
use crate::signals::TechnicalSignal;

/// Buy/Hold/Sell outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote fields as delivered upstream, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteFields {
    pub price: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub price_avg_50: Option<f64>,
    pub price_avg_200: Option<f64>,
    pub market_cap: Option<f64>,
}

/// Validated quote: every level is a finite positive number
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    price: f64,
    day_high: f64,
    day_low: f64,
    price_avg_50: f64,
    price_avg_200: f64,
    market_cap: f64,
}

impl Quote {
    pub fn new(
        price: f64,
        day_high: f64,
        day_low: f64,
        price_avg_50: f64,
        price_avg_200: f64,
        market_cap: f64,
    ) -> Result<Self> {
        Ok(Self {
            price: positive("price", Some(price))?,
            day_high: positive("day high", Some(day_high))?,
            day_low: positive("day low", Some(day_low))?,
            price_avg_50: positive("50-day average", Some(price_avg_50))?,
            price_avg_200: positive("200-day average", Some(price_avg_200))?,
            market_cap: positive("market cap", Some(market_cap))?,
        })
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn day_high(&self) -> f64 {
        self.day_high
    }

    pub fn day_low(&self) -> f64 {
        self.day_low
    }

    pub fn price_avg_50(&self) -> f64 {
        self.price_avg_50
    }

    pub fn price_avg_200(&self) -> f64 {
        self.price_avg_200
    }

    pub fn market_cap(&self) -> f64 {
        self.market_cap
    }
}

impl TryFrom<&QuoteFields> for Quote {
    type Error = ScoringError;

    fn try_from(fields: &QuoteFields) -> Result<Self> {
        Ok(Self {
            price: positive("price", fields.price)?,
            day_high: positive("day high", fields.day_high)?,
            day_low: positive("day low", fields.day_low)?,
            price_avg_50: positive("50-day average", fields.price_avg_50)?,
            price_avg_200: positive("200-day average", fields.price_avg_200)?,
            market_cap: positive("market cap", fields.market_cap)?,
        })
    }
}

/// User-supplied exit levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeParameters {
    pub target_price: f64,
    pub stop_loss: f64,
}

impl TradeParameters {
    pub fn new(target_price: f64, stop_loss: f64) -> Self {
        Self {
            target_price,
            stop_loss,
        }
    }
}

/// Everything one evaluation consumes
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub quote: QuoteFields,
    pub fundamentals: Fundamentals,
    pub params: TradeParameters,
}

/// Output of one evaluation. Metrics that could not be resolved are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub reward: f64,
    pub risk: f64,
    pub technical_chance: f64,
    pub fundamental_score: f64,
    pub fundamental_basis: FundamentalBasis,
    pub composite_chance: f64,
    pub expectancy: f64,
    pub technical_recommendation: Recommendation,
    pub final_decision: Recommendation,
    pub signals: Vec<TechnicalSignal>,
    pub issues: Vec<ScoringError>,
}

impl AnalysisResult {
    /// True when no InvalidRange or MissingData condition was recovered
    pub fn is_assessable(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Require a finite, strictly positive value
pub(crate) fn positive(field: &str, value: Option<f64>) -> Result<f64> {
    let value = value.ok_or_else(|| ScoringError::missing(field))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ScoringError::InvalidRange(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}
