//! Composite chance and trade expectancy

use crate::config::CompositeWeights;
use crate::technical::PriceDistances;

/// Weighted blend of technical chance and fundamental score
pub fn composite_chance(technical: f64, fundamental: f64, weights: &CompositeWeights) -> f64 {
    weights.technical * technical + weights.fundamental * fundamental
}

/// `chance * reward - (1 - chance) * risk`
pub fn expectancy(chance: f64, distances: &PriceDistances) -> f64 {
    chance * distances.reward - (1.0 - chance) * distances.risk
}
