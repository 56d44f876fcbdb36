//! Deflated Sharpe Ratio (Bailey & López de Prado).
//!
//! Corrects an observed Sharpe for selection bias across `n_trials`
//! configurations and for non-normal returns. All Sharpe inputs are
//! per-observation (not annualized); kurtosis is Pearson (3.0 = normal).

use statrs::distribution::{ContinuousCDF, Normal};

/// Euler-Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Expected maximum of `n_trials` standard-normal Sharpe estimates.
///
/// `E[max] ≈ (1 - γ) Φ⁻¹(1 - 1/N) + γ Φ⁻¹(1 - 1/(N e))`; 0.0 for `N <= 1`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn expected_max_sharpe(n_trials: u64) -> f64 {
    if n_trials <= 1 {
        return 0.0;
    }
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return 0.0;
    };
    let n = n_trials as f64;
    (1.0 - EULER_GAMMA) * normal.inverse_cdf(1.0 - 1.0 / n)
        + EULER_GAMMA * normal.inverse_cdf(1.0 - 1.0 / (n * std::f64::consts::E))
}

/// Probability that the true Sharpe exceeds the best of `n_trials` lucky draws.
///
/// With `T = n_obs`, `SR0 = E[max] / sqrt(T - 1)` and
/// `DSR = Φ((SR - SR0) sqrt(T - 1) / sqrt(1 - skew SR + (kurt - 1) / 4 SR²))`.
///
/// Returns 0.0 when `n_obs < 2`, when any input is non-finite, or when the
/// variance term is not positive. The result is always in [0, 1].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn deflated_sharpe(
    observed_sharpe: f64,
    n_trials: u64,
    n_obs: u64,
    skewness: f64,
    kurtosis: f64,
) -> f64 {
    if n_obs < 2 || !observed_sharpe.is_finite() || !skewness.is_finite() || !kurtosis.is_finite()
    {
        return 0.0;
    }
    let Ok(normal) = Normal::new(0.0, 1.0) else {
        return 0.0;
    };

    let dof = (n_obs - 1) as f64;
    let sr0 = expected_max_sharpe(n_trials.max(1)) / dof.sqrt();

    let variance = 1.0 - skewness * observed_sharpe
        + (kurtosis - 1.0) / 4.0 * observed_sharpe.powi(2);
    if !variance.is_finite() || variance <= 0.0 {
        return 0.0;
    }

    let z = (observed_sharpe - sr0) * dof.sqrt() / variance.sqrt();
    if !z.is_finite() {
        return 0.0;
    }
    normal.cdf(z).clamp(0.0, 1.0)
}
