//! Final Buy/Hold/Sell rule

use crate::config::DecisionThresholds;
use crate::types::Recommendation;

/// Decide from composite chance and expectancy.
///
/// Buy needs a strong chance and positive expectancy. A weak chance, or
/// expectancy at or below the threshold, is a Sell. Everything else, NaN
/// inputs included, is a Hold.
pub fn decide(composite: f64, expectancy: f64, thresholds: &DecisionThresholds) -> Recommendation {
    if composite >= thresholds.buy && expectancy > thresholds.expectancy {
        Recommendation::Buy
    } else if composite <= thresholds.sell || expectancy <= thresholds.expectancy {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    }
}
