//! Transaction cost model.
//!
//! Costs are quoted as round-trip basis points per base instrument. The
//! default table can be overridden from YAML:
//!
//! ```yaml
//! default_bps: 8.0
//! per_instrument:
//!   DI1: 1.5
//!   CDS: 12.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CostError;

const BPS_DENOMINATOR: f64 = 10_000.0;

/// Built-in round-trip costs (bps) for the twelve base instruments.
pub const DEFAULT_COSTS_BPS: [(&str, f64); 12] = [
    // rates futures
    ("DI1", 2.0),
    ("DDI", 3.0),
    ("FRC", 2.5),
    // fx
    ("DOL", 1.5),
    ("WDO", 1.5),
    ("NDF", 3.0),
    // inflation-linked and nominal bonds
    ("NTN-B", 6.0),
    ("NTN-F", 5.0),
    ("LTN", 4.0),
    // credit
    ("CDS", 10.0),
    // equity index futures
    ("IND", 2.0),
    ("WIN", 2.0),
];

/// YAML override file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostOverrides {
    /// Rate applied when no prefix matches
    #[serde(default)]
    pub default_bps: Option<f64>,
    /// Per-instrument overrides and additions
    #[serde(default)]
    pub per_instrument: BTreeMap<String, f64>,
}

/// Per-instrument round-trip cost lookup with longest-prefix resolution.
///
/// Keys are stored upper-case and matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CostModelRaw")]
pub struct TransactionCostModel {
    table: BTreeMap<String, f64>,
    #[serde(default)]
    default_bps: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct CostModelRaw {
    table: BTreeMap<String, f64>,
    #[serde(default)]
    default_bps: Option<f64>,
}

impl TryFrom<CostModelRaw> for TransactionCostModel {
    type Error = CostError;

    fn try_from(raw: CostModelRaw) -> Result<Self, Self::Error> {
        let mut model = Self {
            table: BTreeMap::new(),
            default_bps: None,
        };
        for (key, bps) in raw.table {
            model = model.with_override(&key, bps)?;
        }
        match raw.default_bps {
            Some(bps) => model.with_default_bps(bps),
            None => Ok(model),
        }
    }
}

impl Default for TransactionCostModel {
    fn default() -> Self {
        Self {
            table: DEFAULT_COSTS_BPS
                .iter()
                .map(|(key, bps)| ((*key).to_string(), *bps))
                .collect(),
            default_bps: None,
        }
    }
}

impl TransactionCostModel {
    /// Creates the model with the built-in table and no default rate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rate used when no prefix matches.
    ///
    /// # Errors
    /// Returns [`CostError::InvalidRate`] for negative or non-finite rates.
    pub fn with_default_bps(mut self, bps: f64) -> Result<Self, CostError> {
        validate_rate("<default>", bps)?;
        self.default_bps = Some(bps);
        Ok(self)
    }

    /// Adds or replaces a base instrument entry.
    ///
    /// # Errors
    /// Returns [`CostError::InvalidRate`] for negative or non-finite rates.
    pub fn with_override(mut self, key: &str, bps: f64) -> Result<Self, CostError> {
        validate_rate(key, bps)?;
        self.table.insert(key.trim().to_uppercase(), bps);
        Ok(self)
    }

    /// Builds a model from YAML overrides applied on top of the built-in table.
    ///
    /// # Errors
    /// - [`CostError::Yaml`] when the document cannot be parsed.
    /// - [`CostError::InvalidRate`] for invalid rates.
    pub fn from_yaml(yaml: &str) -> Result<Self, CostError> {
        let overrides: CostOverrides = serde_yaml::from_str(yaml)?;
        Self::from_overrides(overrides)
    }

    /// Loads YAML overrides from a file.
    ///
    /// # Errors
    /// - [`CostError::Io`] when the file cannot be read.
    /// - Any error from [`TransactionCostModel::from_yaml`].
    pub fn load(path: &Path) -> Result<Self, CostError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Applies overrides on top of the built-in table.
    ///
    /// # Errors
    /// Returns [`CostError::InvalidRate`] for invalid rates.
    pub fn from_overrides(overrides: CostOverrides) -> Result<Self, CostError> {
        let mut model = Self::default();
        for (key, bps) in overrides.per_instrument {
            model = model.with_override(&key, bps)?;
        }
        if let Some(bps) = overrides.default_bps {
            model = model.with_default_bps(bps)?;
        }
        Ok(model)
    }

    /// Base instrument key for a ticker by longest matching prefix.
    #[must_use]
    pub fn resolve(&self, instrument: &str) -> Option<&str> {
        let ticker = instrument.trim().to_uppercase();
        self.table
            .keys()
            .filter(|key| ticker.starts_with(key.as_str()))
            .max_by_key(|key| key.len())
            .map(String::as_str)
    }

    /// Round-trip cost in bps for a ticker or base instrument.
    ///
    /// # Errors
    /// Returns [`CostError::UnknownInstrument`] when no prefix matches and no
    /// default rate is configured.
    pub fn get_cost_bps(&self, instrument: &str) -> Result<f64, CostError> {
        if let Some(key) = self.resolve(instrument) {
            return Ok(self.table[key]);
        }
        match self.default_bps {
            Some(bps) => {
                tracing::warn!(
                    instrument,
                    default_bps = bps,
                    "no cost prefix match, using default rate"
                );
                Ok(bps)
            }
            None => Err(CostError::UnknownInstrument(instrument.to_string())),
        }
    }

    /// Absolute round-trip cost for trading `notional` of `instrument`.
    ///
    /// # Errors
    /// Same as [`TransactionCostModel::get_cost_bps`].
    pub fn get_cost(&self, notional: f64, instrument: &str) -> Result<f64, CostError> {
        let bps = self.get_cost_bps(instrument)?;
        Ok(notional.abs() * bps / BPS_DENOMINATOR)
    }

    /// Raw table value for an exact base instrument key (no prefix resolution).
    #[must_use]
    pub fn get_round_trip_bps(&self, instrument: &str) -> Option<f64> {
        self.table.get(&instrument.trim().to_uppercase()).copied()
    }

    /// Configured default rate.
    #[must_use]
    pub fn default_bps(&self) -> Option<f64> {
        self.default_bps
    }

    /// Base instrument keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }
}

fn validate_rate(key: &str, bps: f64) -> Result<(), CostError> {
    if bps.is_finite() && bps >= 0.0 {
        Ok(())
    } else {
        Err(CostError::InvalidRate {
            key: key.to_string(),
            bps,
        })
    }
}
