//! Turnover.

/// Mean daily turnover, where each entry is one day's sum of absolute
/// position changes (the `daily_turnover` series of a result).
///
/// Returns 0.0 for empty input. Non-finite entries count as no trading.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_turnover(daily_turnover: &[f64]) -> f64 {
    if daily_turnover.is_empty() {
        return 0.0;
    }
    let total: f64 = daily_turnover
        .iter()
        .map(|t| if t.is_finite() { t.abs() } else { 0.0 })
        .sum();
    total / daily_turnover.len() as f64
}
