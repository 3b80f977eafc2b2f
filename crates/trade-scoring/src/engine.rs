//! The scoring pipeline: quote + fundamentals + trade parameters → result

use tracing::debug;

use crate::composite::{composite_chance, expectancy};
use crate::config::ScoringConfig;
use crate::decision::decide;
use crate::error::{Result, ScoringError};
use crate::fundamental::{FundamentalBasis, Fundamentals, fundamental_score};
use crate::signals::technical_recommendation;
use crate::types::{AnalysisInput, AnalysisResult, Quote, Recommendation};
use crate::technical::PriceDistances;

/// Stateless evaluator; identical inputs always give identical results
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one trade.
    ///
    /// InvalidRange and MissingData never escape: they are collected into
    /// `issues`, the affected metrics become NaN and the final decision is
    /// forced to Hold.
    pub fn evaluate(&self, input: &AnalysisInput) -> AnalysisResult {
        let mut issues = Vec::new();

        let (technical_recommendation, signals) = match Quote::try_from(&input.quote) {
            Ok(quote) => technical_recommendation(&quote, &self.config.technical),
            Err(e) => {
                debug!(error = %e, "technical recommendation not assessable");
                issues.push(e);
                (Recommendation::Hold, Vec::new())
            }
        };

        let (fundamental_score, fundamental_basis) = self.fundamental(&input.fundamentals);

        let distances = input
            .quote
            .price
            .ok_or_else(|| ScoringError::missing("price"))
            .and_then(|price| {
                PriceDistances::between(price, input.params.target_price, input.params.stop_loss)
            });

        let (reward, risk, technical_chance) = match distances {
            Ok(d) => match d.technical_chance() {
                Ok(chance) => (d.reward, d.risk, chance),
                Err(e) => {
                    debug!(error = %e, "technical chance not assessable");
                    issues.push(e);
                    (d.reward, d.risk, f64::NAN)
                }
            },
            Err(e) => {
                // The quote check above already reported an absent price
                if !issues.contains(&e) {
                    debug!(error = %e, "trade levels not assessable");
                    issues.push(e);
                }
                (f64::NAN, f64::NAN, f64::NAN)
            }
        };

        let (composite_chance, expectancy) = if technical_chance.is_nan() {
            (f64::NAN, f64::NAN)
        } else {
            let composite =
                composite_chance(technical_chance, fundamental_score, &self.config.weights);
            let expectancy = expectancy(composite, &PriceDistances { reward, risk });
            (composite, expectancy)
        };

        let final_decision = if issues.is_empty() {
            decide(composite_chance, expectancy, &self.config.thresholds)
        } else {
            Recommendation::Hold
        };

        AnalysisResult {
            reward,
            risk,
            technical_chance,
            fundamental_score,
            fundamental_basis,
            composite_chance,
            expectancy,
            technical_recommendation,
            final_decision,
            signals,
            issues,
        }
    }

    fn fundamental(&self, fundamentals: &Fundamentals) -> (f64, FundamentalBasis) {
        match fundamentals {
            Fundamentals::Reported(inputs) => (
                fundamental_score(inputs),
                FundamentalBasis::Reported {
                    revenue_growth: inputs.revenue_growth,
                    profit_margin: inputs.profit_margin,
                },
            ),
            Fundamentals::Unavailable { reason } => (
                self.config.neutral_fundamental_score,
                FundamentalBasis::Neutral {
                    reason: reason.clone(),
                },
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamental::FundamentalInputs;
    use crate::types::{QuoteFields, TradeParameters};
    use approx::assert_abs_diff_eq;

    fn quote_fields(price: f64) -> QuoteFields {
        QuoteFields {
            price: Some(price),
            day_high: Some(price + 2.0),
            day_low: Some(price - 2.0),
            price_avg_50: Some(price - 5.0),
            price_avg_200: Some(price - 10.0),
            market_cap: Some(2.7e12),
        }
    }

    /// Growth/margin pair whose score is exactly 0.8
    fn strong_fundamentals() -> Fundamentals {
        Fundamentals::Reported(FundamentalInputs::new(0.9, 0.7))
    }

    fn input(price: f64, target: f64, stop: f64, fundamentals: Fundamentals) -> AnalysisInput {
        AnalysisInput {
            quote: quote_fields(price),
            fundamentals,
            params: TradeParameters::new(target, stop),
        }
    }

    #[test]
    fn test_reference_scenario_is_buy() {
        let engine = ScoringEngine::default();
        let result = engine.evaluate(&input(175.0, 185.0, 170.0, strong_fundamentals()));

        assert_abs_diff_eq!(result.technical_chance, 0.6667, epsilon = 1e-4);
        assert_abs_diff_eq!(result.fundamental_score, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(result.composite_chance, 0.7067, epsilon = 1e-4);
        assert_abs_diff_eq!(result.expectancy, 5.6, epsilon = 1e-9);
        assert_eq!(
            result.composite_chance,
            0.7 * result.technical_chance + 0.3 * result.fundamental_score
        );
        assert_eq!(result.technical_recommendation, Recommendation::Hold);
        assert_eq!(result.final_decision, Recommendation::Buy);
        assert!(result.is_assessable());
    }

    #[test]
    fn test_degenerate_levels_force_hold() {
        let engine = ScoringEngine::default();
        let result = engine.evaluate(&input(100.0, 100.0, 100.0, strong_fundamentals()));

        assert!(result.technical_chance.is_nan());
        assert!(result.composite_chance.is_nan());
        assert!(result.expectancy.is_nan());
        assert_eq!(result.final_decision, Recommendation::Hold);
        assert!(matches!(
            result.issues.as_slice(),
            [ScoringError::InvalidRange(_)]
        ));
    }

    #[test]
    fn test_weak_fundamentals_sell() {
        let engine = ScoringEngine::default();
        let weak = Fundamentals::Reported(FundamentalInputs::new(-0.25, -0.10));
        // 1:4 reward to risk keeps the technical chance low
        let result = engine.evaluate(&input(100.0, 102.0, 92.0, weak));

        assert_eq!(result.fundamental_score, 0.0);
        assert!(result.composite_chance <= 0.40);
        assert_eq!(result.final_decision, Recommendation::Sell);
    }

    #[test]
    fn test_missing_price() {
        let engine = ScoringEngine::default();
        let mut request = input(175.0, 185.0, 170.0, strong_fundamentals());
        request.quote.price = None;

        let result = engine.evaluate(&request);
        assert!(result.technical_chance.is_nan());
        assert!(result.reward.is_nan());
        assert_eq!(result.technical_recommendation, Recommendation::Hold);
        assert_eq!(result.final_decision, Recommendation::Hold);
        assert_eq!(result.issues, vec![ScoringError::missing("price")]);
    }

    #[test]
    fn test_missing_moving_average_still_scores_but_holds() {
        let engine = ScoringEngine::default();
        let mut request = input(175.0, 185.0, 170.0, strong_fundamentals());
        request.quote.price_avg_200 = None;

        let result = engine.evaluate(&request);
        assert!(!result.technical_chance.is_nan());
        assert!(!result.expectancy.is_nan());
        assert_eq!(result.final_decision, Recommendation::Hold);
        assert!(matches!(
            result.issues.as_slice(),
            [ScoringError::MissingData(_)]
        ));
    }

    #[test]
    fn test_unavailable_fundamentals_use_neutral_score() {
        let engine = ScoringEngine::default();
        let result = engine.evaluate(&input(
            175.0,
            185.0,
            170.0,
            Fundamentals::unavailable("need two income statements, got 0"),
        ));

        assert_eq!(result.fundamental_score, 0.5);
        assert!(matches!(
            result.fundamental_basis,
            FundamentalBasis::Neutral { .. }
        ));
        assert!(result.is_assessable());
        // 0.7 * 2/3 + 0.3 * 0.5 = 0.6167: between thresholds
        assert_eq!(result.final_decision, Recommendation::Hold);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let engine = ScoringEngine::default();
        let request = input(175.0, 185.0, 170.0, strong_fundamentals());
        let first = serde_json::to_string(&engine.evaluate(&request)).unwrap();
        for _ in 0..10 {
            assert_eq!(serde_json::to_string(&engine.evaluate(&request)).unwrap(), first);
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ScoringConfig::default();
        config.thresholds.sell = 0.9;
        assert!(ScoringEngine::new(config).is_err());
    }
}
