//! Shared signal helpers strategies compose.
//!
//! These are the only pieces of logic the core lends to strategies. All of
//! them degrade to a neutral value instead of producing NaN.

use tessera_types::SignalStrength;

/// |z| at or above which a signal is [`SignalStrength::Strong`].
pub const STRONG_THRESHOLD: f64 = 2.0;
/// |z| at or above which a signal is [`SignalStrength::Moderate`].
pub const MODERATE_THRESHOLD: f64 = 1.0;
/// |z| at or above which a signal is [`SignalStrength::Weak`].
pub const WEAK_THRESHOLD: f64 = 0.5;

/// Standardizes the latest value of `series` against its trailing history.
///
/// The history is the `window` observations immediately before the last
/// element. Returns 0.0 when the history holds fewer than 2 points, when the
/// trailing sample standard deviation is zero, or when any value involved is
/// non-finite.
#[must_use]
#[allow(clippy::cast_precision_loss)] // window sizes never exceed f64 mantissa precision
pub fn compute_z_score(series: &[f64], window: usize) -> f64 {
    let Some((&latest, rest)) = series.split_last() else {
        return 0.0;
    };
    let start = rest.len().saturating_sub(window);
    let history = &rest[start..];

    // fewer than 2 points: no sample variance
    if history.len() < 2 || !latest.is_finite() || history.iter().any(|v| !v.is_finite()) {
        return 0.0;
    }

    let n = history.len() as f64;
    let mean = history.iter().sum::<f64>() / n;
    let variance = history.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();

    // zero trailing variance
    if std <= f64::EPSILON * mean.abs().max(1.0) {
        return 0.0;
    }

    let z = (latest - mean) / std;
    if z.is_finite() { z } else { 0.0 }
}

/// Buckets a z-score into a conviction category by its absolute value.
#[must_use]
pub fn classify_strength(z_score: f64) -> SignalStrength {
    let magnitude = z_score.abs();
    if !magnitude.is_finite() {
        return SignalStrength::Neutral;
    }
    if magnitude >= STRONG_THRESHOLD {
        SignalStrength::Strong
    } else if magnitude >= MODERATE_THRESHOLD {
        SignalStrength::Moderate
    } else if magnitude >= WEAK_THRESHOLD {
        SignalStrength::Weak
    } else {
        SignalStrength::Neutral
    }
}

/// Logistic mapping from confidence to position size.
///
/// The raw logistic `1 / (1 + exp(-k (c - c0)))` is rescaled so that
/// confidence 0 maps to exactly 0 and confidence 1 to exactly `max_size`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SizingCurve {
    /// Logistic steepness `k`
    pub steepness: f64,
    /// Confidence at the inflection point `c0`
    pub midpoint: f64,
    /// Size at full confidence
    pub max_size: f64,
}

impl Default for SizingCurve {
    fn default() -> Self {
        Self {
            steepness: 10.0,
            midpoint: 0.5,
            max_size: 1.0,
        }
    }
}

impl SizingCurve {
    /// Maps a confidence in [0, 1] to a size in [0, `max_size`].
    ///
    /// Out-of-range confidence is clamped; NaN maps to 0.
    #[must_use]
    pub fn size(&self, confidence: f64) -> f64 {
        if confidence.is_nan() || !self.max_size.is_finite() || self.max_size <= 0.0 {
            return 0.0;
        }
        let c = confidence.clamp(0.0, 1.0);
        let k = if self.steepness.is_finite() && self.steepness > 0.0 {
            self.steepness
        } else {
            SizingCurve::default().steepness
        };

        let logistic = |x: f64| 1.0 / (1.0 + (-k * (x - self.midpoint)).exp());
        let low = logistic(0.0);
        let high = logistic(1.0);
        let span = high - low;
        if span <= f64::EPSILON {
            return 0.0;
        }

        (((logistic(c) - low) / span) * self.max_size).clamp(0.0, self.max_size)
    }
}

/// Position size for a confidence using the default [`SizingCurve`]
/// (`k = 10`, `c0 = 0.5`, bounded to [0, 1]).
#[must_use]
pub fn size_from_conviction(confidence: f64) -> f64 {
    SizingCurve::default().size(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_z_score_basic() {
        // history [1, 2, 3]: mean 2, sample std 1
        let z = compute_z_score(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_relative_eq!(z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_z_score_window_trims_history() {
        // only [2, 3, 4] is considered
        let z = compute_z_score(&[100.0, 2.0, 3.0, 4.0, 3.0], 3);
        assert_relative_eq!(z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_z_score_zero_variance() {
        assert!(compute_z_score(&[5.0, 5.0, 5.0, 9.0], 3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_z_score_short_or_empty() {
        assert!(compute_z_score(&[], 10).abs() < f64::EPSILON);
        assert!(compute_z_score(&[1.0], 10).abs() < f64::EPSILON);
        assert!(compute_z_score(&[1.0, 2.0], 10).abs() < f64::EPSILON);
        assert!(compute_z_score(&[1.0, 2.0, 3.0, 4.0], 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_z_score_non_finite() {
        assert!(compute_z_score(&[1.0, f64::NAN, 3.0, 4.0], 3).abs() < f64::EPSILON);
        assert!(compute_z_score(&[1.0, 2.0, 3.0, f64::INFINITY], 3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_classify_strength_thresholds() {
        assert_eq!(classify_strength(2.0), SignalStrength::Strong);
        assert_eq!(classify_strength(-2.5), SignalStrength::Strong);
        assert_eq!(classify_strength(1.0), SignalStrength::Moderate);
        assert_eq!(classify_strength(-0.5), SignalStrength::Weak);
        assert_eq!(classify_strength(0.49), SignalStrength::Neutral);
        assert_eq!(classify_strength(f64::NAN), SignalStrength::Neutral);
    }

    #[test]
    fn test_size_endpoints() {
        assert_relative_eq!(size_from_conviction(0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(size_from_conviction(1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(size_from_conviction(0.5), 0.5, epsilon = 1e-12);
        assert!(size_from_conviction(f64::NAN).abs() < f64::EPSILON);
        assert_relative_eq!(size_from_conviction(7.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(size_from_conviction(-3.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_size_saturates_near_bounds() {
        // sigmoid shape: flat near the ends, steep in the middle
        let low_step = size_from_conviction(0.1) - size_from_conviction(0.0);
        let mid_step = size_from_conviction(0.55) - size_from_conviction(0.45);
        assert!(low_step < mid_step);
    }

    #[test]
    fn test_custom_curve_max_size() {
        let curve = SizingCurve {
            steepness: 6.0,
            midpoint: 0.6,
            max_size: 0.25,
        };
        assert_relative_eq!(curve.size(1.0), 0.25, epsilon = 1e-12);
        assert!(curve.size(0.9) < 0.25);
    }

    proptest! {
        #[test]
        fn prop_size_monotonic_and_bounded(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s_lo = size_from_conviction(lo);
            let s_hi = size_from_conviction(hi);
            prop_assert!(s_lo <= s_hi + 1e-12);
            prop_assert!((0.0..=1.0).contains(&s_lo));
            prop_assert!((0.0..=1.0).contains(&s_hi));
        }
    }
}
