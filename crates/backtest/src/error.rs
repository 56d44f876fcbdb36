//! Backtest error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during backtest orchestration.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// JSON config parse error
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Invalid configuration: date range, weights, window lengths
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No price history at all for the requested range
    #[error("insufficient data for {strategy}: no prices between {start} and {end}")]
    InsufficientData {
        /// Strategy being simulated
        strategy: String,
        /// First requested day
        start: NaiveDate,
        /// Last requested day
        end: NaiveDate,
    },

    /// Cost lookup error
    #[error("cost error: {0}")]
    Cost(#[from] tessera_costs::CostError),

    /// Strategy lookup or construction error
    #[error("strategy error: {0}")]
    Strategy(#[from] tessera_strategy::StrategyError),

    /// Price data error
    #[error("data error: {0}")]
    Data(#[from] tessera_data::DataError),

    /// Result serialization error
    #[error("result error: {0}")]
    Core(#[from] tessera_types::CoreError),
}

impl BacktestError {
    /// Returns true if this is a config parse/validation error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BacktestError::ConfigParse(_) | BacktestError::Configuration(_)
        )
    }

    /// Returns the error category for the output contract.
    /// Categories: `config`, `market_data`, `costs`, `strategy`, `runtime`
    #[must_use]
    pub fn error_category(&self) -> &'static str {
        match self {
            BacktestError::ConfigParse(_) | BacktestError::Configuration(_) => "config",
            BacktestError::Data(_) | BacktestError::InsufficientData { .. } => "market_data",
            BacktestError::Cost(_) => "costs",
            BacktestError::Strategy(_) => "strategy",
            BacktestError::Core(_) => "runtime",
        }
    }
}
