//! Report formatting for terminal and machine consumers

use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use trade_scoring::{AnalysisResult, Fundamentals, fundamental_score};

use crate::engine::{BatchReport, MarketSnapshot, TradeReport};

/// Output shape of reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

pub trait ReportFormatter: Send + Sync {
    fn format(&self) -> ReportFormat;
    /// Quote block and fundamental line shown before asking for exit levels
    fn format_snapshot(&self, snapshot: &MarketSnapshot) -> String;
    fn format_report(&self, report: &TradeReport) -> String;
    fn format_batch(&self, batch: &BatchReport) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Width of the label column in the analysis block
const LABEL_WIDTH: usize = 29;

fn money(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("${v:.2}"),
        _ => "n/a".to_string(),
    }
}

fn percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn decimal(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "n/a".to_string()
    }
}

fn field(label: &str, value: impl fmt::Display) -> String {
    format!("{label:<width$}{value}\n", width = LABEL_WIDTH)
}

pub struct TextFormatter;

impl TextFormatter {
    fn analysis_block(
        symbol: &str,
        price: Option<f64>,
        analysis: &AnalysisResult,
        target: f64,
        stop: f64,
    ) -> String {
        let mut output = String::from("--- Trade Analysis ---\n");
        output.push_str(&field("Ticker:", symbol));
        output.push_str(&field("Current Price:", money(price)));
        output.push_str(&field("Target Price:", money(Some(target))));
        output.push_str(&field("Stop-Loss:", money(Some(stop))));
        output.push_str(&field("Technical Chance:", percent(analysis.technical_chance)));
        output.push_str(&field("Fundamental Score:", percent(analysis.fundamental_score)));
        output.push_str(&field("Composite Chance:", percent(analysis.composite_chance)));
        output.push_str(&field("Calculated Expectancy:", decimal(analysis.expectancy)));
        output.push_str(&field(
            "Technical Recommendation:",
            analysis.technical_recommendation,
        ));
        output.push_str(&field("Final Decision:", analysis.final_decision));
        output
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }

    fn format_snapshot(&self, snapshot: &MarketSnapshot) -> String {
        let quote = &snapshot.quote;
        let mut output = format!(
            "Current price for {} ({}): {}\n",
            snapshot.symbol,
            snapshot.display_name(),
            money(quote.price)
        );
        let market_cap = quote
            .market_cap
            .map_or_else(|| "n/a".to_string(), |cap| format!("${cap:.0}"));
        output.push_str(&format!("Market Cap: {market_cap}\n"));
        output.push_str(&format!(
            "Day High: {}, Day Low: {}\n",
            money(quote.day_high),
            money(quote.day_low)
        ));
        output.push_str(&format!("50-Day Moving Average: {}\n", money(quote.price_avg_50)));
        output.push_str(&format!("200-Day Moving Average: {}\n", money(quote.price_avg_200)));

        match &snapshot.fundamentals {
            Fundamentals::Reported(inputs) => output.push_str(&format!(
                "Fundamental Score for {}: {:.2} (Profit Margin: {:.2}, Revenue Growth: {:.2})\n",
                snapshot.symbol,
                fundamental_score(inputs),
                inputs.profit_margin,
                inputs.revenue_growth
            )),
            Fundamentals::Unavailable { reason } => output.push_str(&format!(
                "Fundamental data unavailable for {} ({reason}). Using neutral score.\n",
                snapshot.symbol
            )),
        }

        for note in &snapshot.notes {
            output.push_str(&format!("Note: {note}\n"));
        }
        output
    }

    fn format_report(&self, report: &TradeReport) -> String {
        let analysis = &report.analysis;
        let mut output = String::new();

        for signal in &analysis.signals {
            let marker = if signal.is_bullish() { '+' } else { '-' };
            output.push_str(&format!("[{marker}] {signal}\n"));
        }
        for issue in &analysis.issues {
            output.push_str(&format!("Warning: {issue}\n"));
        }
        if !output.is_empty() {
            output.push('\n');
        }

        output.push_str(&Self::analysis_block(
            report.symbol(),
            report.snapshot.quote.price,
            analysis,
            report.params.target_price,
            report.params.stop_loss,
        ));
        output
    }

    fn format_batch(&self, batch: &BatchReport) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            "Ticker",
            "Price",
            "Target",
            "Stop",
            "Technical",
            "Fundamental",
            "Composite",
            "Expectancy",
            "Tech. Rec.",
            "Decision",
        ]);

        for entry in &batch.entries {
            match (&entry.report, &entry.error) {
                (Some(report), _) => {
                    let a = &report.analysis;
                    table.add_row(vec![
                        entry.ticker.clone(),
                        money(report.snapshot.quote.price),
                        money(Some(report.params.target_price)),
                        money(Some(report.params.stop_loss)),
                        percent(a.technical_chance),
                        percent(a.fundamental_score),
                        percent(a.composite_chance),
                        decimal(a.expectancy),
                        a.technical_recommendation.to_string(),
                        a.final_decision.to_string(),
                    ]);
                }
                (None, error) => {
                    let mut row = vec![entry.ticker.clone()];
                    row.extend(std::iter::repeat_n("-".to_string(), 8));
                    row.push(format!(
                        "Error: {}",
                        error.as_deref().unwrap_or("unknown failure")
                    ));
                    table.add_row(row);
                }
            }
        }

        format!(
            "{table}\n{} analysed, {} failed\n",
            batch.succeeded(),
            batch.failed()
        )
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {error}")
    }
}

pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: &impl Serialize) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }

    fn format_snapshot(&self, snapshot: &MarketSnapshot) -> String {
        Self::render(snapshot)
    }

    fn format_report(&self, report: &TradeReport) -> String {
        Self::render(report)
    }

    fn format_batch(&self, batch: &BatchReport) -> String {
        Self::render(batch)
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({ "error": error }).to_string()
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: ReportFormat) -> Box<dyn ReportFormatter> {
        match format {
            ReportFormat::Text => Box::new(TextFormatter),
            ReportFormat::Json => Box::new(JsonFormatter),
        }
    }
}
