//! Walk-forward window generation and overfit scoring.

use chrono::{Months, NaiveDate};
use tessera_types::WalkForwardWindow;

use crate::config::WalkForwardConfig;
use crate::error::BacktestError;

/// Calendar bounds of one train/test pair. Ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    /// Zero-based window index
    pub index: usize,
    /// First training day
    pub train_start: NaiveDate,
    /// Exclusive end of training, equal to `test_start`
    pub train_end: NaiveDate,
    /// First test day
    pub test_start: NaiveDate,
    /// Exclusive end of the test segment
    pub test_end: NaiveDate,
}

impl WindowBounds {
    /// Last training day (inclusive).
    #[must_use]
    pub fn train_last(&self) -> NaiveDate {
        self.train_end.pred_opt().unwrap_or(self.train_end)
    }

    /// Last test day (inclusive).
    #[must_use]
    pub fn test_last(&self) -> NaiveDate {
        self.test_end.pred_opt().unwrap_or(self.test_end)
    }
}

/// Lays out train/test windows over `[start, end]`.
///
/// Every offset is taken from `start` in whole months, so with the default
/// step each test segment begins exactly where the previous one ended. Stops
/// at the first window whose test segment would run past `end`.
///
/// # Errors
/// Returns [`BacktestError::Configuration`] for invalid window lengths or a
/// range too short to hold a single window.
pub fn generate_windows(
    start: NaiveDate,
    end: NaiveDate,
    config: &WalkForwardConfig,
) -> Result<Vec<WindowBounds>, BacktestError> {
    config.validate()?;
    let limit = end.succ_opt().unwrap_or(end);
    let months_from_start = |n: u32| start.checked_add_months(Months::new(n));

    let mut windows = Vec::new();
    for index in 0.. {
        let Some(offset) = u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_mul(config.step()))
        else {
            break;
        };
        let train_months = offset.saturating_add(config.train_months);
        let test_months = train_months.saturating_add(config.test_months);
        let (Some(train_start), Some(train_end), Some(test_end)) = (
            months_from_start(offset),
            months_from_start(train_months),
            months_from_start(test_months),
        ) else {
            break;
        };
        if test_end > limit {
            break;
        }
        windows.push(WindowBounds {
            index,
            train_start,
            train_end,
            test_start: train_end,
            test_end,
        });
    }

    if windows.is_empty() {
        return Err(BacktestError::Configuration(format!(
            "{start}..{end} is too short for a {}+{} month walk-forward window",
            config.train_months, config.test_months
        )));
    }
    Ok(windows)
}

/// Scores one window, flagging it when the out-of-sample Sharpe falls below
/// `threshold` times a positive in-sample Sharpe.
#[must_use]
pub fn score_window(
    strategy_id: &str,
    bounds: &WindowBounds,
    in_sample_sharpe: f64,
    out_of_sample_sharpe: f64,
    threshold: f64,
) -> WalkForwardWindow {
    let overfit_ratio = WalkForwardWindow::ratio(in_sample_sharpe, out_of_sample_sharpe);
    let overfit_flag = in_sample_sharpe > 0.0 && overfit_ratio < threshold;

    if overfit_flag {
        tracing::warn!(
            strategy = strategy_id,
            window = bounds.index,
            test_start = %bounds.test_start,
            in_sample_sharpe,
            out_of_sample_sharpe,
            overfit_ratio,
            threshold,
            "walk-forward window looks overfit"
        );
    } else {
        tracing::info!(
            strategy = strategy_id,
            window = bounds.index,
            in_sample_sharpe,
            out_of_sample_sharpe,
            overfit_ratio,
            "walk-forward window"
        );
    }

    WalkForwardWindow {
        index: bounds.index,
        train_start: bounds.train_start,
        train_end: bounds.train_end,
        test_start: bounds.test_start,
        test_end: bounds.test_end,
        in_sample_sharpe,
        out_of_sample_sharpe,
        overfit_ratio,
        overfit_flag,
    }
}
