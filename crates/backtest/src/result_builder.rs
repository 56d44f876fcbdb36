//! Backtest result assembly helpers.

use chrono::Utc;
use serde_json::Value;
use tessera_analytics::{MetricInputs, compute_metrics};
use tessera_types::{BacktestResult, CoreError, EquityPoint};

use crate::config::BacktestConfig;
use crate::event_loop::SimulationOutput;

/// Serializes the config that produced a result.
///
/// # Errors
/// Returns [`CoreError::Serialization`] if the config cannot be encoded.
pub(crate) fn config_blob(config: &BacktestConfig) -> Result<Value, CoreError> {
    Ok(serde_json::to_value(config)?)
}

/// Builds a finished result from a simulation pass.
#[must_use]
pub(crate) fn build_result(
    strategy_id: &str,
    output: SimulationOutput,
    initial_capital: f64,
    config: Value,
) -> BacktestResult {
    let equity_curve =
        EquityPoint::curve_from_returns(initial_capital, &output.dates, &output.daily_returns);

    let metrics = compute_metrics(&MetricInputs {
        daily_returns: &output.daily_returns,
        daily_turnover: &output.daily_turnover,
        equity_curve: &equity_curve,
        avg_holding_days: output.avg_holding_days,
        n_trades: output.n_trades,
        total_costs: output.total_costs,
        total_funding: output.total_funding,
    });

    BacktestResult {
        strategy_id: strategy_id.to_string(),
        dates: output.dates,
        daily_returns: output.daily_returns,
        daily_turnover: output.daily_turnover,
        gross_exposure: output.gross_exposure,
        equity_curve,
        metrics,
        config,
        run_timestamp: Utc::now(),
    }
}
