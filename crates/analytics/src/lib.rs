//! Tessera Analytics
//!
//! Stateless risk/return statistics computed from a completed backtest's
//! return series, the Deflated Sharpe Ratio, and the seven-section
//! tearsheet consumed by reporting layers.
//!
//! Every ratio here returns `0.0` on empty, single-observation or
//! zero-variance input instead of NaN/Inf.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Summary metric computation for a finished run.
pub mod compute;
/// Deflated Sharpe Ratio.
pub mod deflated;
/// Equity-curve drawdown helpers.
pub mod drawdown;
/// Sortino, information and tail ratios.
pub mod ratios;
/// Rolling-window Sharpe.
pub mod rolling;
/// Descriptive statistics shared by the other modules.
pub mod stats;
/// Tearsheet assembly.
pub mod tearsheet;
/// Position turnover.
pub mod turnover;

pub use compute::{MetricInputs, compute_metrics};
pub use deflated::{deflated_sharpe, expected_max_sharpe};
pub use drawdown::compute_drawdown;
pub use ratios::{compute_information_ratio, compute_sortino, compute_tail_ratio};
pub use rolling::compute_rolling_sharpe;
pub use stats::{TRADING_DAYS_PER_YEAR, compute_sharpe};
pub use tearsheet::{Tearsheet, TearsheetOptions, generate_tearsheet, generate_tearsheet_with};
pub use turnover::compute_turnover;
