//! Tessera Types
//!
//! Core data structures for the Tessera backtesting engine.
//! This crate provides the strategy signal value objects, backtest and
//! portfolio result containers, walk-forward windows, and the flat
//! persistence record consumed by the results store.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod error;
pub mod portfolio;
pub mod record;
pub mod result;
pub mod signal;
pub mod walk_forward;

// Re-export main types for convenience
pub use error::CoreError;
pub use portfolio::{CorrelationMatrix, PnlAttribution, PortfolioBacktestResult};
pub use record::{BacktestRecord, DailyRow};
pub use result::{BacktestResult, EquityPoint, Metrics};
pub use signal::{Direction, SignalStrength, StrategySignal};
pub use walk_forward::{WalkForwardReport, WalkForwardWindow};
