//! Technical chance from the reward/risk geometry of a trade

use serde::Serialize;

use crate::error::{Result, ScoringError};
use crate::types::positive;

/// Distances from the current price to the target (reward) and stop (risk)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceDistances {
    pub reward: f64,
    pub risk: f64,
}

impl PriceDistances {
    /// `reward = target - price`, `risk = price - stop`.
    ///
    /// All three levels must be finite and positive. The distances themselves
    /// may be negative when the levels are out of order.
    pub fn between(price: f64, target: f64, stop: f64) -> Result<Self> {
        let price = positive("current price", Some(price))?;
        let target = positive("target price", Some(target))?;
        let stop = positive("stop-loss", Some(stop))?;

        Ok(Self {
            reward: target - price,
            risk: price - stop,
        })
    }

    pub fn total(&self) -> f64 {
        self.reward + self.risk
    }

    /// `reward / (reward + risk)` clamped to [0, 1]
    pub fn technical_chance(&self) -> Result<f64> {
        let total = self.total();
        if total <= 0.0 {
            return Err(ScoringError::InvalidRange(format!(
                "reward + risk must be positive, got {total}"
            )));
        }
        Ok((self.reward / total).clamp(0.0, 1.0))
    }
}

/// Technical chance for a price, target and stop-loss
pub fn technical_chance(price: f64, target: f64, stop: f64) -> Result<f64> {
    PriceDistances::between(price, target, stop)?.technical_chance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_trade() {
        let distances = PriceDistances::between(175.0, 185.0, 170.0).unwrap();
        assert_eq!(distances.reward, 10.0);
        assert_eq!(distances.risk, 5.0);
        assert_abs_diff_eq!(distances.technical_chance().unwrap(), 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_range() {
        let err = technical_chance(100.0, 100.0, 100.0).unwrap_err();
        assert!(matches!(err, ScoringError::InvalidRange(_)));

        // Target below the stop: reward + risk < 0
        assert!(technical_chance(100.0, 90.0, 95.0).is_err());
    }

    #[test]
    fn test_misordered_levels_are_clamped() {
        // Target below price but above stop: negative reward, positive total
        assert_eq!(technical_chance(100.0, 98.0, 90.0).unwrap(), 0.0);
        // Stop above price but below target: negative risk
        assert_eq!(technical_chance(100.0, 120.0, 105.0).unwrap(), 1.0);
    }

    #[test]
    fn test_malformed_prices() {
        assert!(matches!(
            technical_chance(-1.0, 10.0, 5.0),
            Err(ScoringError::InvalidRange(_))
        ));
        assert!(technical_chance(100.0, f64::INFINITY, 90.0).is_err());
        assert!(technical_chance(100.0, 110.0, f64::NAN).is_err());
    }

    #[test]
    fn test_bounded_and_monotonic_in_target() {
        for stop in [50.0, 80.0, 99.0] {
            let mut last = 0.0;
            for step in 1..200 {
                let target = 100.0 + f64::from(step) * 0.5;
                let chance = technical_chance(100.0, target, stop).unwrap();
                assert!((0.0..=1.0).contains(&chance));
                assert!(chance >= last, "chance fell at target {target}");
                last = chance;
            }
        }
    }
}
