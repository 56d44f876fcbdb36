//! Metric computation entrypoints.

use tessera_types::{EquityPoint, Metrics};

use crate::drawdown::compute_drawdown;
use crate::ratios::compute_sortino;
use crate::stats::{TRADING_DAYS_PER_YEAR, compute_sharpe, std_dev};
use crate::turnover::compute_turnover;

/// Series and counters a simulation hands over for summarizing.
#[derive(Debug, Clone, Copy)]
pub struct MetricInputs<'a> {
    /// Net daily returns
    pub daily_returns: &'a [f64],
    /// Sum of absolute position changes per day
    pub daily_turnover: &'a [f64],
    /// Equity curve compounded from the returns
    pub equity_curve: &'a [EquityPoint],
    /// Average length of a position episode in trading days
    pub avg_holding_days: f64,
    /// Number of position changes
    pub n_trades: u64,
    /// Costs charged over the run as a return fraction
    pub total_costs: f64,
    /// Funding charged over the run as a return fraction
    pub total_funding: f64,
}

/// Computes the summary metrics of a completed run.
#[must_use]
#[allow(clippy::cast_precision_loss)] // day counts never exceed f64 mantissa precision
pub fn compute_metrics(inputs: &MetricInputs<'_>) -> Metrics {
    let returns = inputs.daily_returns;
    let n_days = returns.len();

    let total_return = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0;
    let annualized_return = if n_days == 0 {
        0.0
    } else if total_return <= -1.0 {
        -1.0
    } else {
        (1.0 + total_return).powf(TRADING_DAYS_PER_YEAR / n_days as f64) - 1.0
    };

    let drawdown = compute_drawdown(inputs.equity_curve);

    Metrics {
        total_return: finite_or_zero(total_return),
        annualized_return: finite_or_zero(annualized_return),
        annualized_volatility: finite_or_zero(std_dev(returns) * TRADING_DAYS_PER_YEAR.sqrt()),
        sharpe: compute_sharpe(returns, TRADING_DAYS_PER_YEAR),
        sortino: compute_sortino(returns),
        max_drawdown: drawdown.max_drawdown,
        max_drawdown_duration_days: drawdown.max_duration_days,
        turnover: compute_turnover(inputs.daily_turnover),
        avg_holding_days: finite_or_zero(inputs.avg_holding_days),
        n_trades: inputs.n_trades,
        n_days: n_days as u64,
        total_costs: finite_or_zero(inputs.total_costs),
        total_funding: finite_or_zero(inputs.total_funding),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
