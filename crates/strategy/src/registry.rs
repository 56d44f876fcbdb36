//! Strategy registry
//!
//! Catalog of strategy factories keyed by identifier. Each strategy module
//! registers itself with an explicit [`StrategyRegistry::register`] call from
//! its own initialization; the process-wide instance is reachable through
//! [`StrategyRegistry::global`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::StrategyError;
use crate::traits::Strategy;

/// Factory function type for creating strategies from JSON params.
pub type StrategyFactory =
    Arc<dyn Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError> + Send + Sync>;

/// Broad asset class used to group strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Interest-rate futures and swaps
    Rates,
    /// FX spot, futures and forwards
    Fx,
    /// Inflation-linked bonds and breakevens
    Inflation,
    /// Nominal sovereign bonds
    Sovereign,
    /// Credit default swaps
    Credit,
    /// Equity index futures
    Equity,
    /// Multi-asset or unclassified
    #[default]
    Cross,
}

/// Metadata and factory stored for one registered strategy.
#[derive(Clone)]
pub struct RegistrationRecord {
    /// Registered identifier (lowercase)
    pub id: String,
    /// Asset class declared at registration, if any
    pub declared_asset_class: Option<AssetClass>,
    /// Tickers the strategy trades
    pub instruments: Vec<String>,
    factory: StrategyFactory,
}

impl RegistrationRecord {
    /// Declared asset class, or the default classification when none was given.
    #[must_use]
    pub fn asset_class(&self) -> AssetClass {
        self.declared_asset_class.unwrap_or_default()
    }
}

impl fmt::Debug for RegistrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRecord")
            .field("id", &self.id)
            .field("declared_asset_class", &self.declared_asset_class)
            .field("instruments", &self.instruments)
            .finish_non_exhaustive()
    }
}

/// Registry for strategy factories.
///
/// Identifiers are case-insensitive. Re-registering an identifier replaces
/// the previous entry, which keeps module reloads during development cheap.
#[derive(Default)]
pub struct StrategyRegistry {
    records: HashMap<String, RegistrationRecord>,
}

static GLOBAL: Lazy<RwLock<StrategyRegistry>> = Lazy::new(|| RwLock::new(StrategyRegistry::new()));

impl StrategyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Process-wide registry. Written during strategy initialization, read
    /// afterwards.
    pub fn global() -> &'static RwLock<StrategyRegistry> {
        &GLOBAL
    }

    /// Registers into the process-wide registry (see [`StrategyRegistry::register`]).
    ///
    /// A poisoned lock is recovered; registration only ever inserts.
    pub fn register_global<I, S, F>(
        id: impl Into<String>,
        asset_class: Option<AssetClass>,
        instruments: I,
        factory: F,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        let mut registry = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
        registry.register(id, asset_class, instruments, factory);
    }

    /// Registers a strategy factory, overwriting any previous entry for `id`.
    ///
    /// # Arguments
    /// * `id` - Strategy identifier (case-insensitive)
    /// * `asset_class` - Declared asset class; `None` falls back to the default
    /// * `instruments` - Tickers the strategy trades
    /// * `factory` - Builds the strategy from JSON parameters
    pub fn register<I, S, F>(
        &mut self,
        id: impl Into<String>,
        asset_class: Option<AssetClass>,
        instruments: I,
        factory: F,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError>
            + Send
            + Sync
            + 'static,
    {
        let id = id.into().to_lowercase();
        let record = RegistrationRecord {
            id: id.clone(),
            declared_asset_class: asset_class,
            instruments: instruments.into_iter().map(Into::into).collect(),
            factory: Arc::new(factory),
        };
        if self.records.insert(id.clone(), record).is_some() {
            tracing::debug!(strategy_id = %id, "strategy re-registered, metadata replaced");
        } else {
            tracing::debug!(strategy_id = %id, "strategy registered");
        }
    }

    /// Looks up a registration record.
    ///
    /// # Errors
    /// Returns [`StrategyError::NotFound`] if `id` is not registered.
    pub fn get(&self, id: &str) -> Result<&RegistrationRecord, StrategyError> {
        self.records
            .get(&id.to_lowercase())
            .ok_or_else(|| StrategyError::NotFound(id.to_string()))
    }

    /// Checks if a strategy is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(&id.to_lowercase())
    }

    /// Returns all registered identifiers, sorted.
    #[must_use]
    pub fn list_all(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns identifiers whose (possibly defaulted) asset class matches, sorted.
    #[must_use]
    pub fn list_by_asset_class(&self, asset_class: AssetClass) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .values()
            .filter(|record| record.asset_class() == asset_class)
            .map(|record| record.id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Creates a strategy by identifier with caller-supplied parameters.
    ///
    /// # Errors
    /// - [`StrategyError::NotFound`] if `id` is not registered.
    /// - Any error returned by the factory.
    pub fn instantiate(
        &self,
        id: &str,
        params: &serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        let record = self.get(id)?;
        (record.factory)(params)
    }

    /// Creates one instance of every registered strategy with default
    /// (empty) parameters, ordered by identifier.
    ///
    /// # Errors
    /// Returns [`StrategyError::Construction`] naming the first factory that fails.
    pub fn instantiate_all(&self) -> Result<Vec<Box<dyn Strategy>>, StrategyError> {
        let defaults = serde_json::json!({});
        self.list_all()
            .iter()
            .map(|id| {
                self.instantiate(id, &defaults)
                    .map_err(|e| StrategyError::Construction {
                        id: id.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("ids", &self.list_all())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_data::DataSnapshot;
    use tessera_types::StrategySignal;

    /// Dummy strategy for testing
    struct DummyStrategy {
        id: String,
        instruments: Vec<String>,
    }

    impl Strategy for DummyStrategy {
        fn id(&self) -> &str {
            &self.id
        }

        fn instruments(&self) -> &[String] {
            &self.instruments
        }

        fn generate_signals(&self, _snapshot: &DataSnapshot<'_>) -> Vec<StrategySignal> {
            Vec::new()
        }
    }

    fn dummy_factory(
        id: &'static str,
    ) -> impl Fn(&serde_json::Value) -> Result<Box<dyn Strategy>, StrategyError> + Send + Sync
    {
        move |params: &serde_json::Value| {
            let id = params
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or(id)
                .to_string();
            let strategy: Box<dyn Strategy> = Box::new(DummyStrategy {
                id,
                instruments: vec!["DI1F26".to_string()],
            });
            Ok(strategy)
        }
    }

    #[test]
    fn test_registry_new() {
        let registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.list_all().is_empty());
    }

    #[test]
    fn test_register_and_instantiate() {
        let mut registry = StrategyRegistry::new();
        registry.register(
            "DI1_Carry",
            Some(AssetClass::Rates),
            ["DI1F26"],
            dummy_factory("di1_carry"),
        );

        assert!(registry.contains("di1_carry"));
        assert!(registry.contains("DI1_CARRY"));

        let params = serde_json::json!({"id": "custom"});
        let strategy = registry.instantiate("di1_carry", &params).unwrap();
        assert_eq!(strategy.id(), "custom");
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let registry = StrategyRegistry::new();
        assert!(matches!(
            registry.get("nonexistent"),
            Err(StrategyError::NotFound(_))
        ));
        assert!(matches!(
            registry.instantiate("nonexistent", &serde_json::json!({})),
            Err(StrategyError::NotFound(_))
        ));
    }

    #[test]
    fn test_reregister_overwrites_metadata() {
        let mut registry = StrategyRegistry::new();
        registry.register("fx_value", Some(AssetClass::Fx), ["WDO"], dummy_factory("fx_value"));
        registry.register(
            "fx_value",
            Some(AssetClass::Cross),
            ["WDO", "NDF"],
            dummy_factory("fx_value"),
        );

        assert_eq!(registry.len(), 1);
        let record = registry.get("fx_value").unwrap();
        assert_eq!(record.asset_class(), AssetClass::Cross);
        assert_eq!(record.instruments, vec!["WDO".to_string(), "NDF".to_string()]);
    }

    #[test]
    fn test_list_by_asset_class_with_default() {
        let mut registry = StrategyRegistry::new();
        registry.register("di1_carry", Some(AssetClass::Rates), ["DI1F26"], dummy_factory("a"));
        registry.register("ddi_slope", Some(AssetClass::Rates), ["DDI"], dummy_factory("b"));
        registry.register(
            "regime_mix",
            None::<AssetClass>,
            Vec::<String>::new(),
            dummy_factory("c"),
        );

        assert_eq!(
            registry.list_by_asset_class(AssetClass::Rates),
            vec!["ddi_slope".to_string(), "di1_carry".to_string()]
        );
        assert_eq!(
            registry.list_by_asset_class(AssetClass::Cross),
            vec!["regime_mix".to_string()]
        );
        assert!(registry.list_by_asset_class(AssetClass::Credit).is_empty());
    }

    #[test]
    fn test_instantiate_all_sorted() {
        let mut registry = StrategyRegistry::new();
        registry.register("b_strategy", None, ["WIN"], dummy_factory("b_strategy"));
        registry.register("a_strategy", None, ["IND"], dummy_factory("a_strategy"));

        let strategies = registry.instantiate_all().unwrap();
        let ids: Vec<&str> = strategies.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["a_strategy", "b_strategy"]);
    }

    #[test]
    fn test_instantiate_all_reports_failing_factory() {
        let mut registry = StrategyRegistry::new();
        registry.register("broken", None, ["CDS"], |_| {
            Err(StrategyError::InvalidParams("window required".to_string()))
        });

        let err = registry.instantiate_all().err().unwrap();
        assert!(matches!(err, StrategyError::Construction { ref id, .. } if id == "broken"));
    }

    #[test]
    fn test_global_registry_register() {
        StrategyRegistry::register_global(
            "global_probe",
            Some(AssetClass::Credit),
            ["CDS5Y"],
            dummy_factory("global_probe"),
        );
        let registry = StrategyRegistry::global().read().unwrap();
        assert!(registry.contains("global_probe"));
        assert_eq!(
            registry.get("global_probe").unwrap().asset_class(),
            AssetClass::Credit
        );
    }
}
