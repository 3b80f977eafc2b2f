//! trade-check - score a trade idea against live market data
//!
//! # Usage
//!
//! ```bash
//! export FMP_API_KEY="your-key"   # or put it in .env
//!
//! trade-check                                   # interactive prompt
//! trade-check analyze --ticker AAPL --target 185 --stop 170
//! trade-check --output json batch trades.json
//! ```

mod interactive;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use trade_scoring::{ScoringConfig, TradeParameters};
use trade_stock::{
    CachedProvider, FmpClient, FormatterFactory, ReportFormat, StockConfig, TradeAnalyzer,
    TradeRequest,
};
use trade_utils::{LogFormat, directive_for_verbosity, init_tracing};

use crate::interactive::Session;

#[derive(Parser, Debug)]
#[command(name = "trade-check")]
#[command(version, about = "Buy/Hold/Sell check for a trade idea", long_about = None)]
struct Cli {
    /// Financial Modeling Prep API key (defaults to FMP_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// JSON file with scoring weights and thresholds
    #[arg(long, global = true, value_name = "FILE")]
    scoring_config: Option<PathBuf>,

    /// Weight of the technical chance in the composite (fundamental gets the rest)
    #[arg(long, global = true)]
    technical_weight: Option<f64>,

    /// Composite chance at or above which a trade is a Buy
    #[arg(long, global = true)]
    buy_threshold: Option<f64>,

    /// Composite chance at or below which a trade is a Sell
    #[arg(long, global = true)]
    sell_threshold: Option<f64>,

    /// Report format: text or json
    #[arg(long, global = true, default_value_t = ReportFormat::Text)]
    output: ReportFormat,

    /// Log format: pretty or json
    #[arg(long, global = true, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prompt for tickers and exit levels until a blank line
    Interactive,
    /// Analyze one trade
    Analyze {
        #[arg(long)]
        ticker: String,
        /// Target price
        #[arg(long, allow_negative_numbers = true)]
        target: f64,
        /// Stop-loss price
        #[arg(long, allow_negative_numbers = true)]
        stop: f64,
    },
    /// Analyze every trade in a JSON file of {ticker, target_price, stop_loss}
    Batch {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Scoring settings from the optional file, then individual flag overrides
fn scoring_config(cli: &Cli) -> anyhow::Result<ScoringConfig> {
    let base = match &cli.scoring_config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scoring config {}", path.display()))?;
            ScoringConfig::from_json(&json)
                .with_context(|| format!("parsing scoring config {}", path.display()))?
        }
        None => ScoringConfig::default(),
    };

    let mut builder = ScoringConfig::builder().base(base);
    if let Some(weight) = cli.technical_weight {
        builder = builder.technical_weight(weight);
    }
    if let Some(threshold) = cli.buy_threshold {
        builder = builder.buy_threshold(threshold);
    }
    if let Some(threshold) = cli.sell_threshold {
        builder = builder.sell_threshold(threshold);
    }
    Ok(builder.build()?)
}

fn stock_config(cli: &Cli) -> anyhow::Result<StockConfig> {
    let mut builder = StockConfig::builder()
        .with_env_api_key()
        .scoring(scoring_config(cli)?);
    if let Some(key) = &cli.api_key {
        builder = builder.fmp_api_key(key.clone());
    }
    Ok(builder.build()?)
}

fn read_batch(path: &Path) -> anyhow::Result<Vec<TradeRequest>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing batch file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format, &directive_for_verbosity(cli.verbose));

    let config = stock_config(&cli)?;
    let client = FmpClient::from_config(&config)?;
    let provider = CachedProvider::from_config(client, &config);
    let analyzer = TradeAnalyzer::from_config(provider, &config)?;
    let formatter = FormatterFactory::create(cli.output);

    info!(output = %cli.output, "Starting trade-check");

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => {
            let stdin = io::stdin();
            let mut session =
                Session::new(&analyzer, formatter.as_ref(), stdin.lock(), io::stdout());
            if formatter.format() == ReportFormat::Json {
                // keep stdout a clean stream of JSON documents
                session = session.with_console(io::stderr());
            }
            let completed = session.run().await?;
            info!(completed, "Interactive session finished");
        }
        Command::Analyze {
            ticker,
            target,
            stop,
        } => {
            let report = analyzer
                .analyze(&ticker, TradeParameters::new(target, stop))
                .await?;
            if formatter.format() == ReportFormat::Text {
                println!("{}", formatter.format_snapshot(&report.snapshot));
            }
            println!("{}", formatter.format_report(&report));
        }
        Command::Batch { file } => {
            let requests = read_batch(&file)?;
            info!(count = requests.len(), "Running batch");
            let batch = analyzer.analyze_batch(&requests).await;
            println!("{}", formatter.format_batch(&batch));
        }
    }

    Ok(())
}
