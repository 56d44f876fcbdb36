//! Tessera Backtest
//!
//! Drives strategies over a point-in-time price history, charges transaction
//! costs and funding, and assembles single-strategy, portfolio and
//! walk-forward results.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod event_loop;
pub mod logging;
pub mod portfolio;
pub mod result_builder;
pub mod runner;
pub mod walk_forward;

pub use config::{BacktestConfig, LogFormat, LoggingConfig, WalkForwardConfig};
pub use engine::BacktestEngine;
pub use error::BacktestError;
pub use runner::{run_backtest_from_json, run_registered_portfolio};
