//! Tessera Costs
//!
//! Round-trip transaction cost lookup for the instrument universe. Specific
//! tickers (e.g. `DI1F26`) resolve to their base instrument (`DI1`) by longest
//! matching prefix. The model is immutable after construction and can be
//! shared freely across backtest runs.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Cost-model error types.
pub mod error;
/// Transaction cost model and its YAML override format.
pub mod model;

/// Re-export: cost-model error type.
pub use error::CostError;
/// Re-export: YAML override file format.
pub use model::CostOverrides;
/// Re-export: built-in base instrument table.
pub use model::DEFAULT_COSTS_BPS;
/// Re-export: transaction cost model.
pub use model::TransactionCostModel;
