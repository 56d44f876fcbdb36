//! Tessera Data
//!
//! Time-indexed price histories keyed by instrument, and the point-in-time
//! [`DataSnapshot`] view handed to strategies. Data is assumed pre-loaded;
//! nothing here performs I/O beyond parsing an in-memory JSON payload.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(missing_docs)]

/// Data-layer error types.
pub mod error;
/// Point-in-time view over a price store.
pub mod snapshot;
/// Per-instrument price histories.
pub mod store;

/// Re-export: data-layer error type.
pub use error::DataError;
/// Re-export: point-in-time snapshot.
pub use snapshot::DataSnapshot;
/// Re-export: JSON row used by [`PriceStore::from_json`].
pub use store::PriceRow;
/// Re-export: price history store.
pub use store::PriceStore;
