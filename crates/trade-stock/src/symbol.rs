//! Ticker symbol normalization

use crate::error::{Result, StockError};
use regex::Regex;
use std::sync::LazyLock;

static SYMBOL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,9}$").ok());

/// Trim and upper-case `raw`, rejecting anything that is not a plausible ticker
///
/// Accepts class shares (`BRK.B`) and dashed listings (`RDS-A`).
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_uppercase();
    if SYMBOL_RE.as_ref().is_some_and(|re| re.is_match(&symbol)) {
        Ok(symbol)
    } else {
        Err(StockError::InvalidSymbol(raw.trim().to_string()))
    }
}
