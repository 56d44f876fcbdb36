//! Walk-forward validation output.

use chrono::NaiveDate;

/// One train/test window pair with its in-sample and out-of-sample Sharpe.
///
/// Train ranges are half-open `[train_start, train_end)`, test ranges
/// `[test_start, test_end)`; `train_end == test_start`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WalkForwardWindow {
    /// Zero-based window index
    pub index: usize,
    /// First day of the training segment
    pub train_start: NaiveDate,
    /// Exclusive end of the training segment
    pub train_end: NaiveDate,
    /// First day of the test segment
    pub test_start: NaiveDate,
    /// Exclusive end of the test segment
    pub test_end: NaiveDate,
    /// Annualized Sharpe over the training segment
    pub in_sample_sharpe: f64,
    /// Annualized Sharpe over the test segment
    pub out_of_sample_sharpe: f64,
    /// Out-of-sample Sharpe divided by in-sample Sharpe (0.0 when IS is 0)
    pub overfit_ratio: f64,
    /// Set when the ratio fell below the configured warning threshold
    #[serde(default)]
    pub overfit_flag: bool,
}

impl WalkForwardWindow {
    /// Computes the overfit ratio, degrading to 0.0 on a zero or non-finite
    /// in-sample Sharpe.
    #[must_use]
    pub fn ratio(in_sample_sharpe: f64, out_of_sample_sharpe: f64) -> f64 {
        if !in_sample_sharpe.is_finite()
            || !out_of_sample_sharpe.is_finite()
            || in_sample_sharpe.abs() < f64::EPSILON
        {
            return 0.0;
        }
        out_of_sample_sharpe / in_sample_sharpe
    }
}

/// Ordered walk-forward windows plus aggregate diagnostics.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WalkForwardReport {
    /// Strategy evaluated
    pub strategy_id: String,
    /// Windows in chronological order
    pub windows: Vec<WalkForwardWindow>,
    /// Mean in-sample Sharpe across windows
    pub mean_in_sample_sharpe: f64,
    /// Mean out-of-sample Sharpe across windows
    pub mean_out_of_sample_sharpe: f64,
    /// Mean OOS Sharpe over mean IS Sharpe
    pub aggregate_overfit_ratio: f64,
    /// Number of windows flagged as possibly overfit
    pub flagged_windows: usize,
}

impl WalkForwardReport {
    /// Builds a report and its aggregates from evaluated windows.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // window counts are tiny
    pub fn from_windows(strategy_id: impl Into<String>, windows: Vec<WalkForwardWindow>) -> Self {
        let n = windows.len();
        let (mean_is, mean_oos) = if n == 0 {
            (0.0, 0.0)
        } else {
            let sum_is: f64 = windows.iter().map(|w| w.in_sample_sharpe).sum();
            let sum_oos: f64 = windows.iter().map(|w| w.out_of_sample_sharpe).sum();
            (sum_is / n as f64, sum_oos / n as f64)
        };
        let flagged_windows = windows.iter().filter(|w| w.overfit_flag).count();

        Self {
            strategy_id: strategy_id.into(),
            windows,
            mean_in_sample_sharpe: mean_is,
            mean_out_of_sample_sharpe: mean_oos,
            aggregate_overfit_ratio: WalkForwardWindow::ratio(mean_is, mean_oos),
            flagged_windows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(index: usize, is: f64, oos: f64, flag: bool) -> WalkForwardWindow {
        let d = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        WalkForwardWindow {
            index,
            train_start: d,
            train_end: d,
            test_start: d,
            test_end: d,
            in_sample_sharpe: is,
            out_of_sample_sharpe: oos,
            overfit_ratio: WalkForwardWindow::ratio(is, oos),
            overfit_flag: flag,
        }
    }

    #[test]
    fn test_ratio_zero_in_sample() {
        assert!(WalkForwardWindow::ratio(0.0, 1.5).abs() < f64::EPSILON);
        assert!(WalkForwardWindow::ratio(f64::NAN, 1.5).abs() < f64::EPSILON);
        assert!((WalkForwardWindow::ratio(2.0, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_report_aggregates() {
        let report = WalkForwardReport::from_windows(
            "ntnb_breakeven",
            vec![window(0, 2.0, 0.5, true), window(1, 1.0, 0.7, false)],
        );
        assert!((report.mean_in_sample_sharpe - 1.5).abs() < 1e-12);
        assert!((report.mean_out_of_sample_sharpe - 0.6).abs() < 1e-12);
        assert!((report.aggregate_overfit_ratio - 0.4).abs() < 1e-12);
        assert_eq!(report.flagged_windows, 1);
    }

    #[test]
    fn test_report_empty() {
        let report = WalkForwardReport::from_windows("x", Vec::new());
        assert!(report.aggregate_overfit_ratio.abs() < f64::EPSILON);
        assert_eq!(report.flagged_windows, 0);
    }
}
