//! Strategy trait
//!
//! The single flat contract every signal generator satisfies. Shared helper
//! behaviour lives in [`crate::helpers`] as free functions.

use tessera_data::DataSnapshot;
use tessera_types::StrategySignal;

use crate::registry::AssetClass;

/// Trait for trading-signal strategies.
///
/// The engine calls [`Strategy::generate_signals`] once per simulated day and
/// treats the strategy as a black box beyond that. Implementations must be
/// pure with respect to the snapshot: the same snapshot yields the same
/// signals.
///
/// # Thread Safety
/// Strategies must be `Send + Sync` so portfolio runs can evaluate them in
/// parallel.
///
/// # Example
/// ```ignore
/// impl Strategy for Di1Carry {
///     fn id(&self) -> &str { "di1_carry" }
///
///     fn instruments(&self) -> &[String] { &self.instruments }
///
///     fn generate_signals(&self, snapshot: &DataSnapshot) -> Vec<StrategySignal> {
///         let history = snapshot.history("DI1F26", 64);
///         let z = compute_z_score(&history, 63);
///         let direction = if z > 1.0 { Direction::Short } else { Direction::Flat };
///         vec![StrategySignal::new("DI1F26", direction)
///             .with_strength(classify_strength(z))
///             .with_size(size_from_conviction(z.abs() / 3.0))]
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Identifier used for registry lookup and result labelling.
    fn id(&self) -> &str;

    /// Tickers this strategy trades.
    fn instruments(&self) -> &[String];

    /// Produces zero or more signals (at most one per instrument) for the
    /// snapshot date.
    fn generate_signals(&self, snapshot: &DataSnapshot<'_>) -> Vec<StrategySignal>;

    /// Asset class of the strategy.
    fn asset_class(&self) -> AssetClass {
        AssetClass::default()
    }
}
