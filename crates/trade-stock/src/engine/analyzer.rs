//! Trade analyzer - market data in, scored trade out

use chrono::Utc;
use tracing::{debug, info, warn};
use trade_scoring::{AnalysisInput, Fundamentals, QuoteFields, ScoringEngine, TradeParameters};

use crate::api::{IncomeStatement, MarketDataProvider};
use crate::config::{MIN_HISTORY_DAYS, StockConfig};
use crate::error::Result;
use crate::indicators::simple_moving_average;
use crate::symbol::normalize_symbol;

use super::result::{BatchEntry, BatchReport, MarketSnapshot, TradeReport, TradeRequest};

/// Income-statement periods needed for growth and margin
const STATEMENT_PERIODS: usize = 2;

/// Drives a [`MarketDataProvider`] and a [`ScoringEngine`]
pub struct TradeAnalyzer<P> {
    provider: P,
    engine: ScoringEngine,
    history_days: usize,
}

impl<P: MarketDataProvider> TradeAnalyzer<P> {
    pub fn new(provider: P, engine: ScoringEngine) -> Self {
        Self {
            provider,
            engine,
            history_days: MIN_HISTORY_DAYS,
        }
    }

    /// Build with the scoring and history settings of `config`
    pub fn from_config(provider: P, config: &StockConfig) -> Result<Self> {
        let engine = ScoringEngine::new(config.scoring.clone())?;
        Ok(Self {
            provider,
            engine,
            history_days: config.history_days.max(MIN_HISTORY_DAYS),
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Fetch the quote and fundamentals for `raw_symbol`
    ///
    /// Fails only when the symbol is invalid or the quote cannot be fetched.
    /// Missing statements degrade to neutral fundamentals, and missing moving
    /// averages are computed from daily closes when possible.
    pub async fn snapshot(&self, raw_symbol: &str) -> Result<MarketSnapshot> {
        let symbol = normalize_symbol(raw_symbol)?;
        info!(%symbol, "Fetching market snapshot");

        let record = self.provider.quote(&symbol).await?;
        let mut quote = record.to_fields();
        let mut notes = Vec::new();

        if record.missing_moving_average() {
            self.fill_moving_averages(&symbol, &mut quote, &mut notes)
                .await;
        }

        let fundamentals = match self
            .provider
            .income_statements(&symbol, STATEMENT_PERIODS)
            .await
        {
            Ok(statements) => {
                let periods: Vec<_> = statements.iter().map(IncomeStatement::figures).collect();
                Fundamentals::from_periods(&periods)
            }
            Err(e) => {
                warn!(%symbol, error = %e, "Income statements unavailable, using neutral fundamentals");
                Fundamentals::unavailable(e.to_string())
            }
        };

        Ok(MarketSnapshot {
            symbol,
            name: record.name,
            quote,
            fundamentals,
            notes,
            fetched_at: Utc::now(),
        })
    }

    async fn fill_moving_averages(
        &self,
        symbol: &str,
        quote: &mut QuoteFields,
        notes: &mut Vec<String>,
    ) {
        let history = match self.provider.price_history(symbol, self.history_days).await {
            Ok(history) => history,
            Err(e) => {
                warn!(%symbol, error = %e, "Price history unavailable, moving averages left empty");
                notes.push(format!("Moving averages missing and history unavailable: {e}"));
                return;
            }
        };
        debug!(%symbol, closes = history.len(), "Computing missing moving averages");

        for (window, slot) in [(50, &mut quote.price_avg_50), (200, &mut quote.price_avg_200)] {
            if slot.is_some() {
                continue;
            }
            match simple_moving_average(&history, window) {
                Ok(Some(average)) => {
                    *slot = Some(average);
                    notes.push(format!(
                        "{window}-day average computed from daily closes ({average:.2})"
                    ));
                }
                Ok(None) => {
                    warn!(%symbol, window, closes = history.len(), "Not enough history for moving average");
                    notes.push(format!(
                        "{window}-day average unavailable: only {} daily closes",
                        history.len()
                    ));
                }
                Err(e) => {
                    warn!(%symbol, window, error = %e, "Moving average calculation failed");
                    notes.push(format!("{window}-day average unavailable: {e}"));
                }
            }
        }
    }

    /// Score a snapshot against the user's exit levels
    pub fn evaluate(&self, snapshot: &MarketSnapshot, params: TradeParameters) -> TradeReport {
        let input = AnalysisInput {
            quote: snapshot.quote.clone(),
            fundamentals: snapshot.fundamentals.clone(),
            params,
        };
        let analysis = self.engine.evaluate(&input);

        info!(
            symbol = %snapshot.symbol,
            technical = %analysis.technical_recommendation,
            decision = %analysis.final_decision,
            issues = analysis.issues.len(),
            "Trade analysis complete"
        );

        TradeReport {
            snapshot: snapshot.clone(),
            params,
            analysis,
            timestamp: Utc::now(),
        }
    }

    /// Snapshot and score in one step
    pub async fn analyze(&self, symbol: &str, params: TradeParameters) -> Result<TradeReport> {
        let snapshot = self.snapshot(symbol).await?;
        Ok(self.evaluate(&snapshot, params))
    }

    /// Analyze each request in order; a failure is recorded on its entry
    pub async fn analyze_batch(&self, requests: &[TradeRequest]) -> BatchReport {
        let mut entries = Vec::with_capacity(requests.len());

        for request in requests {
            let entry = match self.analyze(&request.ticker, request.params()).await {
                Ok(report) => BatchEntry {
                    ticker: report.symbol().to_string(),
                    report: Some(report),
                    error: None,
                },
                Err(e) => {
                    warn!(ticker = %request.ticker, error = %e, "Batch entry failed");
                    BatchEntry {
                        ticker: request.ticker.clone(),
                        report: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            entries.push(entry);
        }

        info!(total = entries.len(), "Batch analysis complete");
        BatchReport {
            entries,
            timestamp: Some(Utc::now()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HistoricalPrice, MockMarketDataProvider, QuoteRecord};
    use crate::error::StockError;
    use approx::assert_abs_diff_eq;
    use tokio_test::{assert_err, assert_ok};
    use trade_scoring::{FundamentalBasis, Recommendation, ScoringError};

    fn aapl_quote() -> QuoteRecord {
        QuoteRecord {
            symbol: "AAPL".to_string(),
            name: Some("Apple Inc.".to_string()),
            price: Some(175.0),
            market_cap: Some(2.7e12),
            day_high: Some(177.0),
            day_low: Some(173.0),
            price_avg50: Some(170.0),
            price_avg200: Some(165.0),
        }
    }

    // growth 0.9, margin 0.7 -> fundamental score 0.8
    fn strong_statements() -> Vec<IncomeStatement> {
        vec![
            IncomeStatement {
                date: Some("2024-09-28".to_string()),
                period: Some("FY".to_string()),
                revenue: Some(190.0),
                net_income: Some(133.0),
            },
            IncomeStatement {
                date: Some("2023-09-30".to_string()),
                period: Some("FY".to_string()),
                revenue: Some(100.0),
                net_income: Some(50.0),
            },
        ]
    }

    fn closes(count: usize, close: f64) -> Vec<HistoricalPrice> {
        (0..count)
            .map(|i| HistoricalPrice {
                date: format!("day-{i}"),
                close,
            })
            .collect()
    }

    fn analyzer(mock: MockMarketDataProvider) -> TradeAnalyzer<MockMarketDataProvider> {
        TradeAnalyzer::new(mock, ScoringEngine::default())
    }

    #[tokio::test]
    async fn test_analyze_reference_trade() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote()
            .withf(|symbol: &str| symbol == "AAPL")
            .times(1)
            .returning(|_| Ok(aapl_quote()));
        mock.expect_income_statements()
            .withf(|symbol: &str, limit: &usize| symbol == "AAPL" && *limit == 2)
            .times(1)
            .returning(|_, _| Ok(strong_statements()));
        mock.expect_price_history().never();

        let report = analyzer(mock)
            .analyze(" aapl", TradeParameters::new(185.0, 170.0))
            .await
            .unwrap();

        assert_eq!(report.symbol(), "AAPL");
        assert!(report.snapshot.notes.is_empty());
        let analysis = &report.analysis;
        assert_abs_diff_eq!(analysis.technical_chance, 2.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(analysis.fundamental_score, 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(analysis.composite_chance, 0.706_666_666, epsilon = 1e-6);
        assert_abs_diff_eq!(analysis.expectancy, 5.6, epsilon = 1e-9);
        assert_eq!(analysis.final_decision, Recommendation::Buy);
    }

    #[tokio::test]
    async fn test_invalid_symbol_skips_provider() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().never();

        let err = assert_err!(analyzer(mock).snapshot("NOT A TICKER").await);
        assert!(matches!(err, StockError::InvalidSymbol(_)));
    }

    #[tokio::test]
    async fn test_moving_average_fallback() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|_| {
            Ok(QuoteRecord {
                price_avg200: None,
                ..aapl_quote()
            })
        });
        mock.expect_price_history()
            .withf(|_: &str, days: &usize| *days == 200)
            .times(1)
            .returning(|_, days| Ok(closes(days, 160.0)));
        mock.expect_income_statements()
            .returning(|_, _| Ok(strong_statements()));

        let snapshot = assert_ok!(analyzer(mock).snapshot("AAPL").await);
        assert_eq!(snapshot.quote.price_avg_50, Some(170.0));
        assert_abs_diff_eq!(snapshot.quote.price_avg_200.unwrap(), 160.0, epsilon = 1e-9);
        assert_eq!(snapshot.notes.len(), 1);
        assert!(snapshot.notes[0].starts_with("200-day average computed"));
    }

    #[tokio::test]
    async fn test_short_history_degrades_to_hold() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|_| {
            Ok(QuoteRecord {
                price_avg50: None,
                price_avg200: None,
                ..aapl_quote()
            })
        });
        mock.expect_price_history()
            .returning(|_, _| Ok(closes(60, 150.0)));
        mock.expect_income_statements()
            .returning(|_, _| Ok(strong_statements()));

        let report = analyzer(mock)
            .analyze("AAPL", TradeParameters::new(185.0, 170.0))
            .await
            .unwrap();

        assert_eq!(report.snapshot.quote.price_avg_50, Some(150.0));
        assert_eq!(report.snapshot.quote.price_avg_200, None);
        assert_eq!(report.analysis.technical_recommendation, Recommendation::Hold);
        assert_eq!(report.analysis.final_decision, Recommendation::Hold);
        assert!(matches!(
            report.analysis.issues.as_slice(),
            [ScoringError::MissingData(_)]
        ));
        // Scores stay reportable even though the decision is forced
        assert!(report.analysis.composite_chance.is_finite());
    }

    #[tokio::test]
    async fn test_history_failure_is_noted() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|_| {
            Ok(QuoteRecord {
                price_avg50: None,
                ..aapl_quote()
            })
        });
        mock.expect_price_history().returning(|symbol, _| {
            Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no history".to_string(),
            })
        });
        mock.expect_income_statements()
            .returning(|_, _| Ok(strong_statements()));

        let snapshot = analyzer(mock).snapshot("AAPL").await.unwrap();
        assert_eq!(snapshot.quote.price_avg_50, None);
        assert!(snapshot.notes[0].contains("history unavailable"));
    }

    #[tokio::test]
    async fn test_statement_failure_uses_neutral_fundamentals() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|_| Ok(aapl_quote()));
        mock.expect_income_statements().returning(|_, _| {
            Err(StockError::ApiError("Premium endpoint".to_string()))
        });

        let report = analyzer(mock)
            .analyze("AAPL", TradeParameters::new(185.0, 170.0))
            .await
            .unwrap();

        assert!(matches!(
            report.snapshot.fundamentals,
            Fundamentals::Unavailable { .. }
        ));
        assert!(matches!(
            report.analysis.fundamental_basis,
            FundamentalBasis::Neutral { .. }
        ));
        assert_abs_diff_eq!(report.analysis.fundamental_score, 0.5, epsilon = 1e-12);
        assert!(report.analysis.is_assessable());
    }

    #[tokio::test]
    async fn test_single_statement_is_unavailable() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|_| Ok(aapl_quote()));
        mock.expect_income_statements()
            .returning(|_, _| Ok(strong_statements().into_iter().take(1).collect()));

        let snapshot = analyzer(mock).snapshot("AAPL").await.unwrap();
        assert!(matches!(snapshot.fundamentals, Fundamentals::Unavailable { .. }));
        assert!(snapshot.notes.is_empty());
    }

    #[tokio::test]
    async fn test_quote_failure_propagates() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|symbol| {
            Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no quote returned".to_string(),
            })
        });
        mock.expect_income_statements().never();

        let err = analyzer(mock).snapshot("ZZZZ").await.unwrap_err();
        assert!(matches!(err, StockError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_batch_continues_after_failure() {
        let mut mock = MockMarketDataProvider::new();
        mock.expect_quote().returning(|symbol| {
            if symbol == "ZZZZ" {
                Err(StockError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "no quote returned".to_string(),
                })
            } else {
                Ok(QuoteRecord {
                    symbol: symbol.to_string(),
                    ..aapl_quote()
                })
            }
        });
        mock.expect_income_statements()
            .returning(|_, _| Ok(strong_statements()));

        let requests = vec![
            TradeRequest {
                ticker: "AAPL".to_string(),
                target_price: 185.0,
                stop_loss: 170.0,
            },
            TradeRequest {
                ticker: "ZZZZ".to_string(),
                target_price: 10.0,
                stop_loss: 5.0,
            },
            TradeRequest {
                ticker: "msft".to_string(),
                target_price: 175.0,
                stop_loss: 175.0,
            },
        ];

        let batch = analyzer(mock).analyze_batch(&requests).await;
        assert_eq!(batch.entries.len(), 3);
        assert_eq!(batch.succeeded(), 2);
        assert_eq!(batch.failed(), 1);

        assert!(batch.entries[1].error.as_deref().unwrap().contains("ZZZZ"));
        let msft = batch.entries[2].report.as_ref().unwrap();
        assert_eq!(msft.symbol(), "MSFT");
        assert_eq!(msft.analysis.final_decision, Recommendation::Hold);
        assert!(!msft.analysis.is_assessable());
    }

    #[test]
    fn test_from_config_rejects_bad_scoring() {
        let mut config = StockConfig::default();
        config.scoring.weights.fundamental = 0.9;
        let result = TradeAnalyzer::from_config(MockMarketDataProvider::new(), &config);
        assert!(result.is_err());
    }
}
