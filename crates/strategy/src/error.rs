//! Strategy error types

use thiserror::Error;

/// Strategy-specific errors
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Identifier is not registered
    #[error("Strategy not found: {0}")]
    NotFound(String),

    /// Invalid strategy parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Factory failed to build the strategy
    #[error("Failed to construct strategy {id}: {reason}")]
    Construction {
        /// Registered identifier
        id: String,
        /// Factory failure message
        reason: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
