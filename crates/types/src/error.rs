//! Core error types.

use thiserror::Error;

/// Core error types for Tessera value objects.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON (de)serialization of a record blob failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persistence record is structurally invalid
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}
