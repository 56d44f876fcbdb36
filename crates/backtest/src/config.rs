//! Backtest configuration.
//!
//! A config is plain data: it is parsed from JSON (or built in code with the
//! `with_*` setters) and validated once when the engine is constructed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tessera_costs::TransactionCostModel;

use crate::error::BacktestError;

/// Main backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// First day of the simulation (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the simulation (inclusive)
    pub end_date: NaiveDate,
    /// Capital the equity curve compounds from
    #[serde(default = "default_initial_capital")]
    pub initial_capital: f64,
    /// Annual funding rate charged on gross exposure
    #[serde(default)]
    pub funding_rate: f64,
    /// Walk-forward window lengths used by `run_walk_forward`
    #[serde(default)]
    pub walk_forward: Option<WalkForwardConfig>,
    /// Round-trip cost table
    #[serde(default)]
    pub cost_model: TransactionCostModel,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Out-of-sample / in-sample Sharpe ratio below which a window is flagged
    #[serde(default = "default_overfit_threshold")]
    pub overfit_warning_threshold: f64,
}

/// Walk-forward window lengths in calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Training segment length
    pub train_months: u32,
    /// Test segment length
    pub test_months: u32,
    /// Distance between window starts (defaults to `test_months`).
    ///
    /// Only the default keeps test segments contiguous. A longer step leaves
    /// months between consecutive test segments that no window evaluates.
    #[serde(default)]
    pub step_months: Option<u32>,
}

impl WalkForwardConfig {
    /// Window pair with the step equal to the test length.
    #[must_use]
    pub fn new(train_months: u32, test_months: u32) -> Self {
        Self {
            train_months,
            test_months,
            step_months: None,
        }
    }

    /// Effective step between window starts.
    #[must_use]
    pub fn step(&self) -> u32 {
        self.step_months.unwrap_or(self.test_months)
    }

    /// Validates window lengths.
    ///
    /// # Errors
    /// Returns [`BacktestError::Configuration`] for zero lengths or a step
    /// shorter than the test segment (overlapping test windows).
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.train_months == 0 {
            return Err(BacktestError::Configuration(
                "walk_forward.train_months must be > 0".to_string(),
            ));
        }
        if self.test_months == 0 {
            return Err(BacktestError::Configuration(
                "walk_forward.test_months must be > 0".to_string(),
            ));
        }
        if self.step() < self.test_months {
            return Err(BacktestError::Configuration(format!(
                "walk_forward.step_months ({}) must be >= test_months ({})",
                self.step(),
                self.test_months
            )));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level directive (`RUST_LOG` overrides it)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_initial_capital() -> f64 {
    1_000_000.0
}

fn default_overfit_threshold() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl BacktestConfig {
    /// Config over `[start_date, end_date]` with default capital, costs and
    /// no funding.
    #[must_use]
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            initial_capital: default_initial_capital(),
            funding_rate: 0.0,
            walk_forward: None,
            cost_model: TransactionCostModel::default(),
            logging: LoggingConfig::default(),
            overfit_warning_threshold: default_overfit_threshold(),
        }
    }

    /// Parses a JSON config.
    ///
    /// # Errors
    /// Returns [`BacktestError::ConfigParse`] when the JSON is malformed or a
    /// field fails to deserialize (including invalid cost rates).
    pub fn from_json(json: &str) -> Result<Self, BacktestError> {
        serde_json::from_str(json).map_err(|e| BacktestError::ConfigParse(e.to_string()))
    }

    /// Sets the initial capital.
    #[must_use]
    pub fn with_initial_capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = initial_capital;
        self
    }

    /// Sets the annual funding rate.
    #[must_use]
    pub fn with_funding_rate(mut self, funding_rate: f64) -> Self {
        self.funding_rate = funding_rate;
        self
    }

    /// Sets the cost model.
    #[must_use]
    pub fn with_cost_model(mut self, cost_model: TransactionCostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// Sets the walk-forward windows.
    #[must_use]
    pub fn with_walk_forward(mut self, walk_forward: WalkForwardConfig) -> Self {
        self.walk_forward = Some(walk_forward);
        self
    }

    /// Sets the overfit warning threshold.
    #[must_use]
    pub fn with_overfit_warning_threshold(mut self, threshold: f64) -> Self {
        self.overfit_warning_threshold = threshold;
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`BacktestError::Configuration`] describing the first invalid
    /// field.
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.start_date >= self.end_date {
            return Err(BacktestError::Configuration(format!(
                "start_date ({}) must be before end_date ({})",
                self.start_date, self.end_date
            )));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(BacktestError::Configuration(
                "initial_capital must be > 0".to_string(),
            ));
        }
        if !self.funding_rate.is_finite() || self.funding_rate <= -1.0 {
            return Err(BacktestError::Configuration(
                "funding_rate must be finite and > -1".to_string(),
            ));
        }
        if !self.overfit_warning_threshold.is_finite() {
            return Err(BacktestError::Configuration(
                "overfit_warning_threshold must be finite".to_string(),
            ));
        }
        if let Some(walk_forward) = &self.walk_forward {
            walk_forward.validate()?;
        }
        Ok(())
    }

    /// Same config restricted to another date range.
    #[must_use]
    pub(crate) fn for_range(&self, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_from_json_defaults() {
        let config =
            BacktestConfig::from_json(r#"{"start_date":"2024-01-02","end_date":"2024-06-28"}"#)
                .unwrap();
        assert_eq!(config.start_date, day(1, 2));
        assert_relative_eq!(config.initial_capital, 1_000_000.0);
        assert_relative_eq!(config.funding_rate, 0.0);
        assert_relative_eq!(config.overfit_warning_threshold, 0.5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.walk_forward.is_none());
        assert_eq!(config.cost_model, TransactionCostModel::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_full() {
        let json = r#"{
            "start_date": "2020-01-01",
            "end_date": "2023-12-31",
            "initial_capital": 5000000.0,
            "funding_rate": 0.1075,
            "walk_forward": {"train_months": 12, "test_months": 3},
            "cost_model": {"table": {"DI1": 1.0}, "default_bps": 4.0},
            "logging": {"level": "debug", "format": "json"}
        }"#;
        let config = BacktestConfig::from_json(json).unwrap();
        assert_eq!(config.walk_forward.map(|w| w.step()), Some(3));
        assert_eq!(config.cost_model.default_bps(), Some(4.0));
        assert_eq!(config.cost_model.keys().count(), 1);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_malformed() {
        let err = BacktestConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, BacktestError::ConfigParse(_)));

        let negative_cost = r#"{"start_date":"2024-01-02","end_date":"2024-06-28",
            "cost_model":{"table":{"DI1":-1.0}}}"#;
        assert!(matches!(
            BacktestConfig::from_json(negative_cost),
            Err(BacktestError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = BacktestConfig::new(day(1, 2), day(6, 28));
        assert!(base.validate().is_ok());

        let inverted = BacktestConfig::new(day(6, 28), day(1, 2));
        assert!(inverted.validate().unwrap_err().is_config_error());

        assert!(base.clone().with_initial_capital(0.0).validate().is_err());
        assert!(base.clone().with_initial_capital(f64::NAN).validate().is_err());
        assert!(base.clone().with_funding_rate(-1.5).validate().is_err());
        assert!(
            base.clone()
                .with_walk_forward(WalkForwardConfig::new(0, 3))
                .validate()
                .is_err()
        );
        assert!(
            base.with_walk_forward(WalkForwardConfig {
                train_months: 12,
                test_months: 3,
                step_months: Some(1),
            })
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = BacktestConfig::new(day(1, 2), day(6, 28))
            .with_funding_rate(0.05)
            .with_walk_forward(WalkForwardConfig::new(6, 2));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BacktestConfig::from_json(&json).unwrap(), config);
    }
}
