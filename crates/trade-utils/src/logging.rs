//! Logging and tracing utilities

use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output shape of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Default filter directive for a `-v` count: 0 → warn, 1 → info, 2+ → debug.
///
/// Only the workspace crates get raised; dependencies stay at warn.
pub fn directive_for_verbosity(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_string(),
        1 => "info",
        _ => "debug",
    };
    format!("warn,trade_cli={level},trade_stock={level},trade_scoring={level}")
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_directive`. Logs go to stderr so that
/// reports on stdout stay clean.
pub fn init_tracing(format: LogFormat, default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
