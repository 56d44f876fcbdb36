//! Backtest result container, equity curve and summary metrics.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Output of one single-strategy simulation.
///
/// All per-day series share the same length and are aligned with `dates`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BacktestResult {
    /// Identifier of the simulated strategy (or portfolio label)
    pub strategy_id: String,
    /// Trading days covered by the run
    pub dates: Vec<NaiveDate>,
    /// Net daily returns (after costs and funding)
    pub daily_returns: Vec<f64>,
    /// Sum of absolute position changes per day
    #[serde(default)]
    pub daily_turnover: Vec<f64>,
    /// Gross exposure held at the close of each day
    #[serde(default)]
    pub gross_exposure: Vec<f64>,
    /// Equity curve compounded from the initial capital
    pub equity_curve: Vec<EquityPoint>,
    /// Summary statistics
    pub metrics: Metrics,
    /// Serialized configuration that produced this result
    #[serde(default)]
    pub config: Value,
    /// Wall-clock time the run finished
    pub run_timestamp: DateTime<Utc>,
}

impl BacktestResult {
    /// Number of simulated days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.daily_returns.len()
    }

    /// Returns `true` if the run covered no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.daily_returns.is_empty()
    }

    /// Initial capital recorded in the serialized config, if present.
    #[must_use]
    pub fn initial_capital(&self) -> Option<f64> {
        self.config.get("initial_capital").and_then(Value::as_f64)
    }

    /// Iterates `(date, return)` pairs.
    pub fn dated_returns(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .copied()
            .zip(self.daily_returns.iter().copied())
    }
}

/// Point in equity curve
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EquityPoint {
    /// Trading day
    pub date: NaiveDate,
    /// Equity at the close of the day
    pub equity: f64,
    /// Drawdown from the high water mark (fraction)
    pub drawdown: f64,
    /// High water mark
    pub high_water: f64,
}

impl EquityPoint {
    /// Compounds `returns` from `initial_capital` into an equity curve.
    ///
    /// `dates` and `returns` are zipped; any excess on either side is ignored.
    #[must_use]
    pub fn curve_from_returns(
        initial_capital: f64,
        dates: &[NaiveDate],
        returns: &[f64],
    ) -> Vec<EquityPoint> {
        let mut equity = initial_capital;
        let mut high_water = initial_capital;

        dates
            .iter()
            .zip(returns)
            .map(|(date, ret)| {
                equity *= 1.0 + ret;
                high_water = high_water.max(equity);
                let drawdown = if high_water > 0.0 {
                    ((high_water - equity) / high_water).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                EquityPoint {
                    date: *date,
                    equity,
                    drawdown,
                    high_water,
                }
            })
            .collect()
    }
}

/// Performance metrics of a completed run
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metrics {
    /// Compounded total return
    pub total_return: f64,
    /// Geometric annualized return (252 trading days)
    #[serde(default)]
    pub annualized_return: f64,
    /// Annualized volatility of daily returns
    #[serde(default)]
    pub annualized_volatility: f64,
    /// Annualized Sharpe ratio (zero risk-free rate)
    pub sharpe: f64,
    /// Annualized Sortino ratio
    #[serde(default)]
    pub sortino: f64,
    /// Maximum relative drawdown (0..1)
    pub max_drawdown: f64,
    /// Longest drawdown in trading days
    #[serde(default)]
    pub max_drawdown_duration_days: u64,
    /// Mean daily turnover
    pub turnover: f64,
    /// Average position holding period in trading days
    pub avg_holding_days: f64,
    /// Number of position changes
    #[serde(default)]
    pub n_trades: u64,
    /// Number of simulated days
    #[serde(default)]
    pub n_days: u64,
    /// Total transaction costs as a return fraction
    #[serde(default)]
    pub total_costs: f64,
    /// Total funding charged as a return fraction
    #[serde(default)]
    pub total_funding: f64,
}
