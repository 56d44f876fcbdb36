//! Strategy signal value objects.

use std::collections::BTreeMap;

/// Direction of a strategy signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Long position
    Long,
    /// Short position
    Short,
    /// No position
    Flat,
}

impl Direction {
    /// Signed unit exposure: +1 long, -1 short, 0 flat.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
            Direction::Flat => 0.0,
        }
    }
}

/// Discrete conviction bucket derived from a z-score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    /// |z| >= 2.0
    Strong,
    /// |z| >= 1.0
    Moderate,
    /// |z| >= 0.5
    Weak,
    /// Below every threshold
    #[default]
    Neutral,
}

/// Signal produced once per strategy, instrument and evaluation date.
///
/// Built through [`StrategySignal::new`] and the `with_*` builders; the engine
/// only ever reads it afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrategySignal {
    /// Instrument ticker the signal refers to (e.g. `DI1F26`)
    pub instrument: String,
    /// Direction of the signal
    pub direction: Direction,
    /// Conviction bucket
    #[serde(default)]
    pub strength: SignalStrength,
    /// Confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    /// Standardized indicator value
    #[serde(default)]
    pub z_score: f64,
    /// Unstandardized indicator value
    #[serde(default)]
    pub raw_value: f64,
    /// Position size as a fraction of capital
    #[serde(default)]
    pub suggested_size: f64,
    /// Optional entry price level
    #[serde(default)]
    pub entry_level: Option<f64>,
    /// Optional stop loss level
    #[serde(default)]
    pub stop_loss: Option<f64>,
    /// Optional take profit level
    #[serde(default)]
    pub take_profit: Option<f64>,
    /// Expected holding horizon in days
    #[serde(default)]
    pub holding_period_days: u32,
    /// Strategy-specific context
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl StrategySignal {
    /// Creates a signal with neutral strength, zero size and empty metadata.
    pub fn new(instrument: impl Into<String>, direction: Direction) -> Self {
        Self {
            instrument: instrument.into(),
            direction,
            strength: SignalStrength::Neutral,
            confidence: 0.0,
            z_score: 0.0,
            raw_value: 0.0,
            suggested_size: 0.0,
            entry_level: None,
            stop_loss: None,
            take_profit: None,
            holding_period_days: 0,
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the conviction bucket.
    #[must_use]
    pub fn with_strength(mut self, strength: SignalStrength) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the confidence, clamped to [0, 1]. Non-finite input becomes 0.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }

    /// Sets the standardized and raw indicator values.
    #[must_use]
    pub fn with_indicator(mut self, z_score: f64, raw_value: f64) -> Self {
        self.z_score = z_score;
        self.raw_value = raw_value;
        self
    }

    /// Sets the position size fraction. Negative or non-finite sizes become 0.
    #[must_use]
    pub fn with_size(mut self, suggested_size: f64) -> Self {
        self.suggested_size = if suggested_size.is_finite() {
            suggested_size.max(0.0)
        } else {
            0.0
        };
        self
    }

    /// Sets entry, stop loss and take profit levels.
    #[must_use]
    pub fn with_levels(
        mut self,
        entry_level: Option<f64>,
        stop_loss: Option<f64>,
        take_profit: Option<f64>,
    ) -> Self {
        self.entry_level = entry_level;
        self.stop_loss = stop_loss;
        self.take_profit = take_profit;
        self
    }

    /// Sets the expected holding period.
    #[must_use]
    pub fn with_holding_period(mut self, days: u32) -> Self {
        self.holding_period_days = days;
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Signed target position implied by this signal.
    #[must_use]
    pub fn target_position(&self) -> f64 {
        self.direction.sign() * self.suggested_size
    }
}
