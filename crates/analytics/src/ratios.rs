//! Downside, benchmark-relative and tail ratios.

use crate::stats::{TRADING_DAYS_PER_YEAR, is_zero_variance, mean, percentile, std_dev};

/// Annualized Sortino ratio at a zero target return.
///
/// Downside deviation is `sqrt(mean(min(r, 0)^2))` over all observations.
/// Returns 0.0 when `len < 2`, the series has zero variance, or there is no
/// downside.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_sortino(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    // constant series, including constant losses
    if is_zero_variance(std_dev(returns)) {
        return 0.0;
    }
    let downside = returns
        .iter()
        .map(|r| r.min(0.0).powi(2))
        .sum::<f64>()
        / returns.len() as f64;
    let downside_dev = downside.sqrt();
    if is_zero_variance(downside_dev) {
        return 0.0;
    }
    let sortino = mean(returns) / downside_dev * TRADING_DAYS_PER_YEAR.sqrt();
    if sortino.is_finite() { sortino } else { 0.0 }
}

/// Annualized information ratio of active returns over `benchmark`.
///
/// Without a benchmark the active return is the return itself. The series are
/// truncated to the shorter length. Returns 0.0 when fewer than 2 active
/// returns remain or the tracking error is zero.
#[must_use]
pub fn compute_information_ratio(returns: &[f64], benchmark: Option<&[f64]>) -> f64 {
    let active: Vec<f64> = match benchmark {
        Some(bench) => returns.iter().zip(bench).map(|(r, b)| r - b).collect(),
        None => returns.to_vec(),
    };
    if active.len() < 2 {
        return 0.0;
    }
    let tracking_error = std_dev(&active);
    if is_zero_variance(tracking_error) {
        return 0.0;
    }
    let ir = mean(&active) / tracking_error * TRADING_DAYS_PER_YEAR.sqrt();
    if ir.is_finite() { ir } else { 0.0 }
}

/// `|p95| / |p5|` of the return distribution.
///
/// Returns 0.0 when `len < 2`, the series has zero variance, or the 5th
/// percentile is zero.
#[must_use]
pub fn compute_tail_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 || is_zero_variance(std_dev(returns)) {
        return 0.0;
    }
    let p95 = percentile(returns, 95.0).abs();
    let p5 = percentile(returns, 5.0).abs();
    if p5 <= f64::EPSILON {
        return 0.0;
    }
    let ratio = p95 / p5;
    if ratio.is_finite() { ratio } else { 0.0 }
}
