//! Tessera Strategy
//!
//! Strategy layer for the Tessera backtesting engine.
//! Provides the [`Strategy`] trait every signal generator implements, the
//! shared helpers strategies compose (z-score, conviction sizing, strength
//! classification) and the [`StrategyRegistry`] catalog.
//!
//! # Example
//! ```ignore
//! use tessera_strategy::{AssetClass, StrategyRegistry};
//!
//! let mut registry = StrategyRegistry::new();
//! registry.register("di1_carry", Some(AssetClass::Rates), ["DI1F26"], |params| {
//!     Ok(Box::new(Di1Carry::from_params(params)?))
//! });
//!
//! let strategy = registry.instantiate("di1_carry", &serde_json::json!({"window": 63}))?;
//! let signals = strategy.generate_signals(&store.snapshot(date));
//! ```

#![deny(clippy::all)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod helpers;
pub mod registry;
pub mod traits;

// Re-export main types
pub use error::StrategyError;
pub use helpers::{SizingCurve, classify_strength, compute_z_score, size_from_conviction};
pub use registry::{AssetClass, RegistrationRecord, StrategyFactory, StrategyRegistry};
pub use traits::Strategy;
