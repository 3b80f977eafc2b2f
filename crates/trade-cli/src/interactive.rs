//! Interactive prompt loop

use std::io::{BufRead, Write};

use tracing::debug;
use trade_scoring::TradeParameters;
use trade_stock::{MarketDataProvider, ReportFormatter, StockError, TradeAnalyzer};

/// Parse a price typed at the prompt; a leading `$` is accepted
pub fn parse_price(raw: &str) -> Result<f64, StockError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).replace(',', "");
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(StockError::InvalidInput(format!(
            "'{trimmed}' is not a valid price"
        ))),
    }
}

fn is_exit(input: &str) -> bool {
    input.is_empty() || input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

/// Ticker → quote → exit levels → analysis, until the user stops
///
/// Reports go to `output`. The banner and prompts go there too unless a
/// separate console is set with [`Session::with_console`].
pub struct Session<'a, P, R, W> {
    analyzer: &'a TradeAnalyzer<P>,
    formatter: &'a dyn ReportFormatter,
    input: R,
    output: W,
    console: Option<Box<dyn Write + 'a>>,
}

impl<'a, P, R, W> Session<'a, P, R, W>
where
    P: MarketDataProvider,
    R: BufRead,
    W: Write,
{
    pub fn new(
        analyzer: &'a TradeAnalyzer<P>,
        formatter: &'a dyn ReportFormatter,
        input: R,
        output: W,
    ) -> Self {
        Self {
            analyzer,
            formatter,
            input,
            output,
            console: None,
        }
    }

    /// Send the banner and prompts to `console` instead of `output`
    pub fn with_console(mut self, console: impl Write + 'a) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    fn console(&mut self) -> &mut dyn Write {
        if let Some(console) = self.console.as_mut() {
            return console.as_mut();
        }
        &mut self.output
    }

    /// Write `prompt` and read one line; `None` on end of input
    fn prompt(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        let console = self.console();
        write!(console, "{prompt}")?;
        console.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_price(&mut self, prompt: &str) -> std::io::Result<Option<Result<f64, StockError>>> {
        Ok(self.prompt(prompt)?.map(|line| parse_price(&line)))
    }

    /// Run until a blank ticker, `exit`/`quit`, or end of input.
    ///
    /// Returns the number of completed analyses.
    pub async fn run(&mut self) -> anyhow::Result<usize> {
        writeln!(self.console(), "=== Enhanced Trade Analysis Tool ===")?;
        let mut completed = 0;

        loop {
            let Some(ticker) = self.prompt("\nEnter the stock ticker symbol (blank to exit): ")? else {
                break;
            };
            if is_exit(&ticker) {
                break;
            }

            let snapshot = match self.analyzer.snapshot(&ticker).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    debug!(%ticker, error = %e, "Snapshot failed");
                    writeln!(self.output, "{}", self.formatter.format_error(&e.to_string()))?;
                    continue;
                }
            };
            writeln!(self.output, "\n{}", self.formatter.format_snapshot(&snapshot))?;

            let symbol = snapshot.symbol.clone();
            let target = match self.prompt_price(&format!("Enter your target price for {symbol}: "))? {
                None => break,
                Some(Ok(price)) => price,
                Some(Err(e)) => {
                    writeln!(self.output, "{}", self.formatter.format_error(&e.to_string()))?;
                    continue;
                }
            };
            let stop = match self.prompt_price(&format!("Enter your stop-loss price for {symbol}: "))? {
                None => break,
                Some(Ok(price)) => price,
                Some(Err(e)) => {
                    writeln!(self.output, "{}", self.formatter.format_error(&e.to_string()))?;
                    continue;
                }
            };

            let report = self
                .analyzer
                .evaluate(&snapshot, TradeParameters::new(target, stop));
            writeln!(self.output, "\n{}", self.formatter.format_report(&report))?;
            completed += 1;
        }

        writeln!(self.console(), "Goodbye!")?;
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Cursor;
    use tokio_test::assert_ok;
    use trade_scoring::ScoringEngine;
    use trade_stock::{
        FormatterFactory, HistoricalPrice, IncomeStatement, QuoteRecord, ReportFormat,
        TextFormatter,
    };

    /// Serves one fixed quote for AAPL; every other symbol is unknown
    struct FakeProvider;

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn quote(&self, symbol: &str) -> trade_stock::Result<QuoteRecord> {
            if symbol != "AAPL" {
                return Err(StockError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "no quote returned".to_string(),
                });
            }
            Ok(QuoteRecord {
                symbol: "AAPL".to_string(),
                name: Some("Apple Inc.".to_string()),
                price: Some(175.0),
                market_cap: Some(2.7e12),
                day_high: Some(177.0),
                day_low: Some(173.0),
                price_avg50: Some(170.0),
                price_avg200: Some(165.0),
            })
        }

        async fn income_statements(
            &self,
            _symbol: &str,
            _limit: usize,
        ) -> trade_stock::Result<Vec<IncomeStatement>> {
            Ok(vec![
                IncomeStatement {
                    revenue: Some(190.0),
                    net_income: Some(133.0),
                    ..Default::default()
                },
                IncomeStatement {
                    revenue: Some(100.0),
                    net_income: Some(50.0),
                    ..Default::default()
                },
            ])
        }

        async fn price_history(
            &self,
            _symbol: &str,
            _days: usize,
        ) -> trade_stock::Result<Vec<HistoricalPrice>> {
            Ok(Vec::new())
        }
    }

    async fn run_session(script: &str) -> (usize, String) {
        let analyzer = TradeAnalyzer::new(FakeProvider, ScoringEngine::default());
        let mut output = Vec::new();
        let completed = {
            let mut session =
                Session::new(&analyzer, &TextFormatter, Cursor::new(script), &mut output);
            assert_ok!(session.run().await)
        };
        (completed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("185").unwrap(), 185.0);
        assert_eq!(parse_price(" $1,250.50 ").unwrap(), 1250.5);
        assert!(matches!(
            parse_price("abc"),
            Err(StockError::InvalidInput(_))
        ));
        assert!(parse_price("inf").is_err());
        assert!(parse_price("").is_err());
    }

    #[tokio::test]
    async fn test_full_round() {
        let (completed, output) = run_session("aapl\n185\n170\n\n").await;
        assert_eq!(completed, 1);
        assert!(output.contains("Current price for AAPL (Apple Inc.): $175.00"));
        assert!(output.contains("Enter your target price for AAPL: "));
        assert!(output.contains("Enter your stop-loss price for AAPL: "));
        assert!(output.contains("Composite Chance:            70.7%"));
        assert!(output.contains("Final Decision:              Buy"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn test_bad_price_continues() {
        let (completed, output) = run_session("AAPL\nlots\nAAPL\n185\n170\nquit\n").await;
        assert_eq!(completed, 1);
        assert!(output.contains("Error: Invalid input: 'lots' is not a valid price"));
    }

    #[tokio::test]
    async fn test_unknown_ticker_continues() {
        let (completed, output) = run_session("ZZZZ\nAAPL\n185\n170\nexit\n").await;
        assert_eq!(completed, 1);
        assert!(output.contains("Error: Data not available for ZZZZ"));
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let (completed, output) = run_session("AAPL\n185\n").await;
        assert_eq!(completed, 0);
        assert!(output.ends_with("Goodbye!\n"));

        let (completed, _) = run_session("").await;
        assert_eq!(completed, 0);
    }

    #[tokio::test]
    async fn test_json_session_keeps_prompts_off_output() {
        let analyzer = TradeAnalyzer::new(FakeProvider, ScoringEngine::default());
        let formatter = FormatterFactory::create(ReportFormat::Json);
        let mut console = Vec::new();
        let mut output = Vec::new();
        let completed = {
            let mut session = Session::new(
                &analyzer,
                formatter.as_ref(),
                Cursor::new("aapl\n185\n170\nZZZZ\n"),
                &mut output,
            )
            .with_console(&mut console);
            session.run().await.unwrap()
        };
        assert_eq!(completed, 1);

        let console = String::from_utf8(console).unwrap();
        assert!(console.starts_with("=== Enhanced Trade Analysis Tool ==="));
        assert!(console.contains("Enter your target price for AAPL: "));
        assert!(console.ends_with("Goodbye!\n"));

        let output = String::from_utf8(output).unwrap();
        let documents: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&output)
            .into_iter::<serde_json::Value>()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[1]["analysis"]["final_decision"], "Buy");
        assert!(documents[2]["error"].as_str().unwrap().contains("ZZZZ"));
    }
}
