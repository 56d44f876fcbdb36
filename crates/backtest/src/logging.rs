//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; binaries and tests that want to
//! see them call [`init_logging`] once.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::{LogFormat, LoggingConfig};

/// Builds the filter, letting `RUST_LOG` override the configured level.
fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs a global subscriber for `config`.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case the existing one is kept.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let subscriber = tracing_subscriber::registry().with(build_filter(&config.level));

    let installed = match config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true);
            subscriber.with(fmt_layer).try_init().is_ok()
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(true)
                .with_file(false)
                .with_line_number(false);
            subscriber.with(fmt_layer).try_init().is_ok()
        }
    };

    if installed {
        tracing::debug!(level = %config.level, format = ?config.format, "logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            format: LogFormat::Json,
        };
        let _ = init_logging(&config);
        // a second install never succeeds
        assert!(!init_logging(&LoggingConfig::default()));
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let _ = build_filter("not a [valid directive");
    }
}
