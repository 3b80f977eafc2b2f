//! Fundamental score from revenue growth and profit margin

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Growth and margin as fractions (0.12 = 12%); either may be negative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FundamentalInputs {
    pub revenue_growth: f64,
    pub profit_margin: f64,
}

/// Income-statement figures for one reporting period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodFigures {
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
}

impl FundamentalInputs {
    pub fn new(revenue_growth: f64, profit_margin: f64) -> Self {
        Self {
            revenue_growth,
            profit_margin,
        }
    }

    /// Derive growth and margin from the latest and previous periods.
    ///
    /// Growth is period-over-period revenue change; margin is the latest net
    /// income over the latest revenue.
    pub fn from_periods(latest: &PeriodFigures, previous: &PeriodFigures) -> Result<Self> {
        let revenue_latest = non_zero("latest revenue", latest.revenue)?;
        let revenue_previous = non_zero("previous revenue", previous.revenue)?;
        let net_income = latest
            .net_income
            .filter(|v| v.is_finite())
            .ok_or_else(|| ScoringError::missing("latest net income"))?;

        Ok(Self {
            revenue_growth: (revenue_latest - revenue_previous) / revenue_previous,
            profit_margin: net_income / revenue_latest,
        })
    }
}

fn non_zero(field: &str, value: Option<f64>) -> Result<f64> {
    let value = value.ok_or_else(|| ScoringError::missing(field))?;
    if !value.is_finite() || value == 0.0 {
        return Err(ScoringError::InvalidRange(format!(
            "{field} must be a non-zero number, got {value}"
        )));
    }
    Ok(value)
}

/// Fundamentals as seen by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Fundamentals {
    Reported(FundamentalInputs),
    /// Not enough statement data; scored with the configured neutral value
    Unavailable { reason: String },
}

impl Fundamentals {
    /// Build from income-statement periods ordered newest first
    pub fn from_periods(periods: &[PeriodFigures]) -> Self {
        match periods {
            [latest, previous, ..] => match FundamentalInputs::from_periods(latest, previous) {
                Ok(inputs) => Fundamentals::Reported(inputs),
                Err(e) => Fundamentals::Unavailable {
                    reason: e.to_string(),
                },
            },
            _ => Fundamentals::Unavailable {
                reason: format!(
                    "need two income statements, got {}",
                    periods.len()
                ),
            },
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Fundamentals::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Where the fundamental score in a result came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum FundamentalBasis {
    Reported {
        revenue_growth: f64,
        profit_margin: f64,
    },
    Neutral {
        reason: String,
    },
}

/// Average of growth and margin, each clamped into [0, 1].
///
/// Monotonic non-decreasing in both inputs. Non-finite inputs count as zero.
pub fn fundamental_score(inputs: &FundamentalInputs) -> f64 {
    let growth = unit_clamp(inputs.revenue_growth);
    let margin = unit_clamp(inputs.profit_margin);
    (growth + margin) / 2.0
}

fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
