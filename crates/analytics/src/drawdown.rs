//! Helpers for equity-curve derived metrics.

use tessera_types::EquityPoint;

/// Drawdown summary of an equity curve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawdownStats {
    /// Maximum relative drawdown in [0, 1]
    pub max_drawdown: f64,
    /// Maximum absolute drawdown in currency units
    pub max_drawdown_abs: f64,
    /// Longest stretch, in trading days, spent below a high water mark
    pub max_duration_days: u64,
}

/// Computes maximum drawdown (relative, absolute) and duration in trading days.
///
/// The high water mark is seeded from the first point's `high_water`, so a
/// curve compounded from its initial capital counts a loss on day one.
#[must_use]
pub fn compute_drawdown(equity: &[EquityPoint]) -> DrawdownStats {
    let Some(first) = equity.first() else {
        return DrawdownStats::default();
    };

    let mut high_water = first.high_water.max(first.equity);
    let mut stats = DrawdownStats::default();
    let mut current_dd_start = 0usize;
    let mut in_drawdown = false;

    for (idx, point) in equity.iter().enumerate() {
        if point.equity >= high_water {
            if in_drawdown {
                let duration = (idx - current_dd_start) as u64;
                stats.max_duration_days = stats.max_duration_days.max(duration);
                in_drawdown = false;
            }
            high_water = point.equity;
        } else if high_water > 0.0 {
            if !in_drawdown {
                current_dd_start = idx;
                in_drawdown = true;
            }

            let dd_abs = high_water - point.equity;
            stats.max_drawdown_abs = stats.max_drawdown_abs.max(dd_abs);
            stats.max_drawdown = stats.max_drawdown.max(dd_abs / high_water);
        }
    }

    if in_drawdown {
        let duration = (equity.len() - current_dd_start) as u64;
        stats.max_duration_days = stats.max_duration_days.max(duration);
    }

    stats.max_drawdown = stats.max_drawdown.clamp(0.0, 1.0);
    stats
}

/// Per-day `(date, drawdown)` pairs of a curve.
#[must_use]
pub fn drawdown_series(equity: &[EquityPoint]) -> Vec<(chrono::NaiveDate, f64)> {
    equity.iter().map(|p| (p.date, p.drawdown)).collect()
}
