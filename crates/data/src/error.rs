//! Data-layer error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while building or querying price histories.
#[derive(Debug, Error)]
pub enum DataError {
    /// A price was NaN, infinite or non-positive.
    #[error("Invalid price for {instrument} on {date}: {price}")]
    InvalidPrice {
        /// Instrument ticker.
        instrument: String,
        /// Observation date.
        date: NaiveDate,
        /// Offending value.
        price: f64,
    },

    /// Payload could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}
