//! Rolling-window statistics.

use crate::stats::{TRADING_DAYS_PER_YEAR, compute_sharpe};

/// Annualized Sharpe over each trailing `window` of returns.
///
/// Element `i` covers `returns[i..i + window]`, so the output has
/// `len - window + 1` entries. Zero-variance windows yield 0.0. Returns an
/// empty vector when `window < 2` or the series is shorter than `window`.
#[must_use]
pub fn compute_rolling_sharpe(returns: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || returns.len() < window {
        return Vec::new();
    }
    returns
        .windows(window)
        .map(|w| compute_sharpe(w, TRADING_DAYS_PER_YEAR))
        .collect()
}
