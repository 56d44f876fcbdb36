//! High-level backtest runner helpers.

use serde_json::Value;
use tessera_data::PriceStore;
use tessera_strategy::StrategyRegistry;
use tessera_types::{CoreError, PortfolioBacktestResult};

use crate::config::BacktestConfig;
use crate::engine::BacktestEngine;
use crate::error::BacktestError;

/// Receives config JSON, price rows as JSON and a registered strategy id,
/// returns result JSON.
///
/// `prices_json` is an array of `{instrument, date, price}` rows.
///
/// # Errors
/// - [`BacktestError::ConfigParse`] when the config JSON cannot be parsed.
/// - [`BacktestError::Configuration`] for invalid configuration values.
/// - [`BacktestError::Data`] for malformed rows or invalid prices.
/// - [`BacktestError::Strategy`] when the strategy is unknown or its factory
///   rejects `params`.
/// - Any error from the run itself.
pub fn run_backtest_from_json(
    config_json: &str,
    prices_json: &str,
    registry: &StrategyRegistry,
    strategy_id: &str,
    params: &Value,
) -> Result<String, BacktestError> {
    let config = BacktestConfig::from_json(config_json)?;
    let store = PriceStore::from_json(prices_json)?;
    let engine = BacktestEngine::new(config, store)?;
    let strategy = registry.instantiate(strategy_id, params)?;
    let result = engine.run(strategy.as_ref())?;

    Ok(serde_json::to_string(&result).map_err(CoreError::from)?)
}

/// Runs one default-parameter instance of every registered strategy as an
/// equal-weighted portfolio.
///
/// # Errors
/// - [`BacktestError::Configuration`] when the registry is empty.
/// - [`BacktestError::Strategy`] when a factory fails.
/// - Any error from [`BacktestEngine::run_portfolio`].
pub fn run_registered_portfolio(
    engine: &BacktestEngine,
    registry: &StrategyRegistry,
) -> Result<PortfolioBacktestResult, BacktestError> {
    if registry.is_empty() {
        return Err(BacktestError::Configuration(
            "no strategies registered".to_string(),
        ));
    }
    let strategies = registry.instantiate_all()?;
    engine.run_portfolio(&strategies, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tessera_data::{DataError, DataSnapshot};
    use tessera_strategy::{Strategy, StrategyError};
    use tessera_types::{BacktestResult, Direction, StrategySignal};

    struct Carry {
        id: String,
        size: f64,
        instruments: Vec<String>,
    }

    impl Strategy for Carry {
        fn id(&self) -> &str {
            &self.id
        }

        fn instruments(&self) -> &[String] {
            &self.instruments
        }

        fn generate_signals(&self, _snapshot: &DataSnapshot<'_>) -> Vec<StrategySignal> {
            vec![
                StrategySignal::new(self.instruments[0].clone(), Direction::Long)
                    .with_size(self.size),
            ]
        }
    }

    fn registry() -> StrategyRegistry {
        let mut registry = StrategyRegistry::new();
        for (id, instrument) in [("di1_carry", "DI1F26"), ("ntnb_carry", "NTN-B35")] {
            registry.register(id, None, [instrument], move |params: &Value| {
                let size = params.get("size").and_then(Value::as_f64).unwrap_or(1.0);
                if size < 0.0 {
                    return Err(StrategyError::InvalidParams("size must be >= 0".to_string()));
                }
                let strategy: Box<dyn Strategy> = Box::new(Carry {
                    id: id.to_string(),
                    size,
                    instruments: vec![instrument.to_string()],
                });
                Ok(strategy)
            });
        }
        registry
    }

    fn prices_json() -> String {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let rows: Vec<Value> = start
            .iter_days()
            .take(20)
            .flat_map(|d| {
                [
                    serde_json::json!({"instrument": "DI1F26", "date": d, "price": 100.0}),
                    serde_json::json!({"instrument": "NTN-B35", "date": d, "price": 4_000.0}),
                ]
            })
            .collect();
        serde_json::to_string(&rows).unwrap()
    }

    fn store() -> PriceStore {
        PriceStore::from_json(&prices_json()).unwrap()
    }

    const CONFIG: &str = r#"{"start_date":"2024-03-01","end_date":"2024-03-31"}"#;

    #[test]
    fn test_run_from_json() {
        let json = run_backtest_from_json(
            CONFIG,
            &prices_json(),
            &registry(),
            "DI1_CARRY",
            &serde_json::json!({"size": 0.5}),
        )
        .unwrap();
        let result: BacktestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.strategy_id, "di1_carry");
        assert_eq!(result.len(), 20);
        assert!((result.metrics.total_return + 0.5 * 0.0002).abs() < 1e-12);
    }

    #[test]
    fn test_run_from_json_errors() {
        let prices = prices_json();
        let err = run_backtest_from_json("{", &prices, &registry(), "di1_carry", &Value::Null)
            .unwrap_err();
        assert_eq!(err.error_category(), "config");

        let err = run_backtest_from_json(CONFIG, &prices, &registry(), "missing", &Value::Null)
            .unwrap_err();
        assert_eq!(err.error_category(), "strategy");

        let err = run_backtest_from_json(
            CONFIG,
            &prices_json(),
            &registry(),
            "di1_carry",
            &serde_json::json!({"size": -1.0}),
        )
        .unwrap_err();
        assert!(matches!(err, BacktestError::Strategy(StrategyError::InvalidParams(_))));
    }

    #[test]
    fn test_run_from_json_bad_prices() {
        let err = run_backtest_from_json(CONFIG, "[{", &registry(), "di1_carry", &Value::Null)
            .unwrap_err();
        assert!(matches!(err, BacktestError::Data(DataError::Parse(_))));
        assert_eq!(err.error_category(), "market_data");

        let negative = r#"[{"instrument": "DI1F26", "date": "2024-03-01", "price": -1.0}]"#;
        let err = run_backtest_from_json(CONFIG, negative, &registry(), "di1_carry", &Value::Null)
            .unwrap_err();
        assert!(matches!(err, BacktestError::Data(DataError::InvalidPrice { .. })));
    }

    #[test]
    fn test_registered_portfolio() {
        let config = BacktestConfig::from_json(CONFIG).unwrap();
        let engine = BacktestEngine::new(config, store()).unwrap();
        let portfolio = run_registered_portfolio(&engine, &registry()).unwrap();
        assert_eq!(
            portfolio.individual.keys().collect::<Vec<_>>(),
            vec!["di1_carry", "ntnb_carry"]
        );
        assert!((portfolio.weights["ntnb_carry"] - 0.5).abs() < 1e-12);

        let empty = run_registered_portfolio(&engine, &StrategyRegistry::new()).unwrap_err();
        assert!(empty.is_config_error());
    }
}
