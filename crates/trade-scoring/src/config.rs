//! Tunable weights and thresholds for the scoring pipeline

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Blend of technical chance and fundamental score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub technical: f64,
    pub fundamental: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            technical: 0.7,
            fundamental: 0.3,
        }
    }
}

impl CompositeWeights {
    /// Weights with `fundamental = 1 - technical`
    pub fn from_technical(technical: f64) -> Self {
        Self {
            technical,
            fundamental: 1.0 - technical,
        }
    }
}

/// Cut-offs for the final Buy/Hold/Sell rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionThresholds {
    /// Composite chance at or above which a positive-expectancy trade is a Buy
    pub buy: f64,
    /// Composite chance at or below which the trade is a Sell
    pub sell: f64,
    /// Expectancy must exceed this for Buy; at or below it forces Sell
    pub expectancy: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            buy: 0.65,
            sell: 0.40,
            expectancy: 0.0,
        }
    }
}

/// Parameters of the moving-average / day-range rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalRules {
    /// Market caps below this are flagged as small caps (Sell)
    pub small_cap_threshold: f64,
    /// Day-range position below this is "near the day's low" (Buy)
    pub near_low_ratio: f64,
    /// Day-range position above this is "near the day's high" (Sell)
    pub near_high_ratio: f64,
}

impl Default for TechnicalRules {
    fn default() -> Self {
        Self {
            small_cap_threshold: 1_000_000_000.0,
            near_low_ratio: 0.3,
            near_high_ratio: 0.7,
        }
    }
}

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: CompositeWeights,
    pub thresholds: DecisionThresholds,
    pub technical: TechnicalRules,
    /// Fundamental score used when statements are unavailable
    pub neutral_fundamental_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CompositeWeights::default(),
            thresholds: DecisionThresholds::default(),
            technical: TechnicalRules::default(),
            neutral_fundamental_score: 0.5,
        }
    }
}

const WEIGHT_TOLERANCE: f64 = 1e-9;

impl ScoringConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScoringConfigBuilder {
        ScoringConfigBuilder::default()
    }

    /// Parse a (possibly partial) JSON document; absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ScoringError::InvalidConfig(format!("malformed scoring config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let CompositeWeights {
            technical,
            fundamental,
        } = self.weights;
        if !(technical.is_finite() && fundamental.is_finite()) || technical < 0.0 || fundamental < 0.0
        {
            return Err(ScoringError::InvalidConfig(
                "composite weights must be non-negative numbers".to_string(),
            ));
        }
        if (technical + fundamental - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ScoringError::InvalidConfig(format!(
                "composite weights must sum to 1, got {}",
                technical + fundamental
            )));
        }

        let DecisionThresholds { buy, sell, expectancy } = self.thresholds;
        if !(0.0..=1.0).contains(&buy) || !(0.0..=1.0).contains(&sell) {
            return Err(ScoringError::InvalidConfig(
                "decision thresholds must lie in [0, 1]".to_string(),
            ));
        }
        if sell >= buy {
            return Err(ScoringError::InvalidConfig(format!(
                "sell threshold ({sell}) must be below buy threshold ({buy})"
            )));
        }
        if !expectancy.is_finite() {
            return Err(ScoringError::InvalidConfig(
                "expectancy threshold must be finite".to_string(),
            ));
        }

        let rules = self.technical;
        if !(rules.small_cap_threshold.is_finite() && rules.small_cap_threshold >= 0.0) {
            return Err(ScoringError::InvalidConfig(
                "small-cap threshold must be a non-negative number".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&rules.near_low_ratio)
            || !(0.0..=1.0).contains(&rules.near_high_ratio)
            || rules.near_low_ratio > rules.near_high_ratio
        {
            return Err(ScoringError::InvalidConfig(
                "day-range ratios must satisfy 0 <= low <= high <= 1".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.neutral_fundamental_score) {
            return Err(ScoringError::InvalidConfig(
                "neutral fundamental score must lie in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ScoringConfig
#[derive(Debug, Default)]
pub struct ScoringConfigBuilder {
    base: Option<ScoringConfig>,
    technical_weight: Option<f64>,
    buy_threshold: Option<f64>,
    sell_threshold: Option<f64>,
    expectancy_threshold: Option<f64>,
    technical_rules: Option<TechnicalRules>,
    neutral_fundamental_score: Option<f64>,
}

impl ScoringConfigBuilder {
    /// Start from an existing configuration instead of the defaults
    pub fn base(mut self, config: ScoringConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the technical weight; the fundamental weight becomes `1 - weight`
    pub fn technical_weight(mut self, weight: f64) -> Self {
        self.technical_weight = Some(weight);
        self
    }

    pub fn buy_threshold(mut self, threshold: f64) -> Self {
        self.buy_threshold = Some(threshold);
        self
    }

    pub fn sell_threshold(mut self, threshold: f64) -> Self {
        self.sell_threshold = Some(threshold);
        self
    }

    pub fn expectancy_threshold(mut self, threshold: f64) -> Self {
        self.expectancy_threshold = Some(threshold);
        self
    }

    pub fn technical_rules(mut self, rules: TechnicalRules) -> Self {
        self.technical_rules = Some(rules);
        self
    }

    pub fn neutral_fundamental_score(mut self, score: f64) -> Self {
        self.neutral_fundamental_score = Some(score);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ScoringConfig> {
        let mut config = self.base.unwrap_or_default();

        if let Some(weight) = self.technical_weight {
            config.weights = CompositeWeights::from_technical(weight);
        }
        if let Some(buy) = self.buy_threshold {
            config.thresholds.buy = buy;
        }
        if let Some(sell) = self.sell_threshold {
            config.thresholds.sell = sell;
        }
        if let Some(expectancy) = self.expectancy_threshold {
            config.thresholds.expectancy = expectancy;
        }
        if let Some(rules) = self.technical_rules {
            config.technical = rules;
        }
        if let Some(score) = self.neutral_fundamental_score {
            config.neutral_fundamental_score = score;
        }

        config.validate()?;
        Ok(config)
    }
}
