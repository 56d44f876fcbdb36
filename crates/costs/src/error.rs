//! Cost-model error types.

use thiserror::Error;

/// Errors raised by the transaction cost model.
#[derive(Debug, Error)]
pub enum CostError {
    /// No base instrument prefix matches and no default rate is configured.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    /// A configured rate is negative or not finite.
    #[error("Invalid cost rate for {key}: {bps} bps")]
    InvalidRate {
        /// Instrument key.
        key: String,
        /// Offending rate.
        bps: f64,
    },

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CostError::UnknownInstrument("XYZ123".to_string());
        assert_eq!(err.to_string(), "Unknown instrument: XYZ123");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "costs.yaml");
        let err: CostError = io_err.into();
        assert!(matches!(err, CostError::Io(_)));
    }
}
