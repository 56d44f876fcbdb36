//! Descriptive statistics with explicit degenerate-input guards.

/// Trading days used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Standard deviations at or below this are treated as zero variance.
///
/// Absorbs the rounding noise a constant series picks up in the mean.
pub const ZERO_VARIANCE_EPS: f64 = 1e-12;

/// Arithmetic mean; 0.0 for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    if m.is_finite() { m } else { 0.0 }
}

/// Sample standard deviation (n - 1); 0.0 when `len < 2`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let sd = var.sqrt();
    if sd.is_finite() { sd } else { 0.0 }
}

/// Returns `true` when a standard deviation counts as zero variance.
#[must_use]
pub fn is_zero_variance(sd: f64) -> bool {
    !sd.is_finite() || sd <= ZERO_VARIANCE_EPS
}

/// Population skewness; 0.0 when `len < 3` or zero variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn skewness(values: &[f64]) -> f64 {
    if values.len() < 3 {
        return 0.0;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    if is_zero_variance(m2.sqrt()) {
        return 0.0;
    }
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / n;
    let s = m3 / m2.powf(1.5);
    if s.is_finite() { s } else { 0.0 }
}

/// Pearson (non-excess) kurtosis, 3.0 for a normal distribution.
///
/// Returns 3.0 when `len < 4` or the series has zero variance so callers
/// feeding it into the Sharpe variance term fall back to the Gaussian case.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn kurtosis(values: &[f64]) -> f64 {
    const GAUSSIAN: f64 = 3.0;
    if values.len() < 4 {
        return GAUSSIAN;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
    if is_zero_variance(m2.sqrt()) {
        return GAUSSIAN;
    }
    let m4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>() / n;
    let k = m4 / (m2 * m2);
    if k.is_finite() { k } else { GAUSSIAN }
}

/// Linear-interpolated percentile (`q` in [0, 100]); 0.0 for empty input.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Annualized Sharpe ratio of periodic returns at a zero risk-free rate.
///
/// Returns 0.0 when `len < 2` or the standard deviation is zero.
#[must_use]
pub fn compute_sharpe(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let sd = std_dev(returns);
    if is_zero_variance(sd) {
        return 0.0;
    }
    let sharpe = mean(returns) / sd * periods_per_year.max(0.0).sqrt();
    if sharpe.is_finite() { sharpe } else { 0.0 }
}

/// Per-observation (non-annualized) Sharpe; same guards as [`compute_sharpe`].
#[must_use]
pub fn per_period_sharpe(returns: &[f64]) -> f64 {
    compute_sharpe(returns, 1.0)
}

/// Pearson correlation of two equally long series.
///
/// Returns 0.0 when lengths differ, `len < 2`, or either side has zero variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.len() < 2 {
        return 0.0;
    }
    let (sa, sb) = (std_dev(a), std_dev(b));
    if is_zero_variance(sa) || is_zero_variance(sb) {
        return 0.0;
    }
    let (ma, mb) = (mean(a), mean(b));
    let cov = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / (a.len() - 1) as f64;
    let rho = cov / (sa * sb);
    if rho.is_finite() { rho.clamp(-1.0, 1.0) } else { 0.0 }
}
