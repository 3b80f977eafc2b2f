//! Technical recommendation from market cap, moving averages and day range

use serde::Serialize;
use std::fmt;

use crate::config::TechnicalRules;
use crate::types::{Quote, Recommendation};

/// One observation made while deriving the technical recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum TechnicalSignal {
    SmallCap { market_cap: f64 },
    AboveMovingAverage { window: u32, average: f64 },
    BelowMovingAverage { window: u32, average: f64 },
    NearDayLow { position: f64 },
    NearDayHigh { position: f64 },
}

impl TechnicalSignal {
    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            TechnicalSignal::AboveMovingAverage { .. } | TechnicalSignal::NearDayLow { .. }
        )
    }
}

impl fmt::Display for TechnicalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TechnicalSignal::SmallCap { market_cap } => {
                write!(f, "Market Cap: ${market_cap:.0} (small cap: consider selling)")
            }
            TechnicalSignal::AboveMovingAverage { window: 50, average } => write!(
                f,
                "Price is above the 50-day moving average ({average:.2}). Bullish signal - up."
            ),
            TechnicalSignal::BelowMovingAverage { window: 50, average } => write!(
                f,
                "Price is below the 50-day moving average ({average:.2}). Bearish signal - down."
            ),
            TechnicalSignal::AboveMovingAverage { window, average } => write!(
                f,
                "Price is above the {window}-day moving average ({average:.2}). Long-term bullish trend - up."
            ),
            TechnicalSignal::BelowMovingAverage { window, average } => write!(
                f,
                "Price is below the {window}-day moving average ({average:.2}). Long-term bearish trend - down."
            ),
            TechnicalSignal::NearDayLow { .. } => {
                write!(f, "Price is close to day's low. Potential buy signal.")
            }
            TechnicalSignal::NearDayHigh { .. } => {
                write!(f, "Price is close to day's high. Potential sell signal.")
            }
        }
    }
}

/// Position of the price inside the day's range; 0.5 for a flat day
pub fn day_range_position(quote: &Quote) -> f64 {
    let span = quote.day_high() - quote.day_low();
    if span == 0.0 {
        0.5
    } else {
        (quote.price() - quote.day_low()) / span
    }
}

/// Run the rule sequence. Each rule may override the recommendation set by
/// an earlier one, so the day-range rule has the last word.
pub fn technical_recommendation(
    quote: &Quote,
    rules: &TechnicalRules,
) -> (Recommendation, Vec<TechnicalSignal>) {
    let mut recommendation = Recommendation::Hold;
    let mut signals = Vec::new();

    if quote.market_cap() < rules.small_cap_threshold {
        recommendation = Recommendation::Sell;
        signals.push(TechnicalSignal::SmallCap {
            market_cap: quote.market_cap(),
        });
    }

    for (window, average) in [(50, quote.price_avg_50()), (200, quote.price_avg_200())] {
        if quote.price() > average {
            signals.push(TechnicalSignal::AboveMovingAverage { window, average });
        } else {
            recommendation = Recommendation::Sell;
            signals.push(TechnicalSignal::BelowMovingAverage { window, average });
        }
    }

    let position = day_range_position(quote);
    if position < rules.near_low_ratio {
        recommendation = Recommendation::Buy;
        signals.push(TechnicalSignal::NearDayLow { position });
    } else if position > rules.near_high_ratio {
        recommendation = Recommendation::Sell;
        signals.push(TechnicalSignal::NearDayHigh { position });
    }

    (recommendation, signals)
}
