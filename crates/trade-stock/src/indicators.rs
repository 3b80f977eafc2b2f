//! Moving averages computed from daily closes
//!
//! Used when the quote endpoint leaves `priceAvg50` or `priceAvg200` empty.

use crate::api::HistoricalPrice;
use crate::error::{Result, StockError};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Simple moving average of the newest `window` closes
///
/// `history` is newest first, as FMP returns it. Returns `None` when fewer
/// than `window` closes are available.
pub fn simple_moving_average(history: &[HistoricalPrice], window: usize) -> Result<Option<f64>> {
    if history.len() < window {
        return Ok(None);
    }

    let mut sma = SimpleMovingAverage::new(window)
        .map_err(|e| StockError::IndicatorError(e.to_string()))?;

    let mut average = None;
    for bar in history[..window].iter().rev() {
        average = Some(sma.next(bar.close));
    }
    Ok(average)
}

/// 50- and 200-day averages, each `None` when history is too short
pub fn moving_averages(history: &[HistoricalPrice]) -> Result<(Option<f64>, Option<f64>)> {
    Ok((
        simple_moving_average(history, 50)?,
        simple_moving_average(history, 200)?,
    ))
}
