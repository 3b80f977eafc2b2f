//! Analysis result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trade_scoring::{AnalysisResult, Fundamentals, QuoteFields, TradeParameters};

/// Market data gathered for one ticker, ready to be scored
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub name: Option<String>,
    pub quote: QuoteFields,
    pub fundamentals: Fundamentals,
    /// Fallbacks taken while assembling the snapshot
    pub notes: Vec<String>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Company name, or the symbol when FMP has none
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }
}

/// A scored trade for one ticker
#[derive(Debug, Clone, Serialize)]
pub struct TradeReport {
    pub snapshot: MarketSnapshot,
    pub params: TradeParameters,
    pub analysis: AnalysisResult,
    pub timestamp: DateTime<Utc>,
}

impl TradeReport {
    pub fn symbol(&self) -> &str {
        &self.snapshot.symbol
    }
}

/// One line of a batch file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub ticker: String,
    pub target_price: f64,
    pub stop_loss: f64,
}

impl TradeRequest {
    pub fn params(&self) -> TradeParameters {
        TradeParameters::new(self.target_price, self.stop_loss)
    }
}

/// Outcome for one request of a batch; exactly one of `report` and `error` is set
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<TradeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.report.is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_request_from_json() {
        let requests: Vec<TradeRequest> = serde_json::from_str(
            r#"[{"ticker": "AAPL", "target_price": 185.0, "stop_loss": 170.0}]"#,
        )
        .unwrap();
        assert_eq!(requests[0].ticker, "AAPL");
        assert_eq!(requests[0].params(), TradeParameters::new(185.0, 170.0));
    }

    #[test]
    fn test_batch_counts() {
        let report = BatchReport {
            entries: vec![BatchEntry {
                ticker: "ZZZZ".to_string(),
                report: None,
                error: Some("Data not available".to_string()),
            }],
            timestamp: None,
        };
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["entries"][0].get("report").is_none());
    }
}
