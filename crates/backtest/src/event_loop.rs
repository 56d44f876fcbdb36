//! Daily simulation loop.
//!
//! Positions are fractions of capital. A position held into day `t` earns
//! the instrument's return from its last mark to the price on `t`; days with
//! no price for an instrument leave it unmarked until data resumes.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tessera_costs::TransactionCostModel;
use tessera_data::PriceStore;
use tessera_strategy::Strategy;

use crate::error::BacktestError;

const BPS_DENOMINATOR: f64 = 10_000.0;
const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const POSITION_EPS: f64 = 1e-12;

/// Inputs of one simulation pass.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams<'a> {
    /// Price history
    pub store: &'a PriceStore,
    /// Round-trip cost table
    pub costs: &'a TransactionCostModel,
    /// Annual funding rate on gross exposure
    pub funding_rate: f64,
    /// First day (inclusive)
    pub start: NaiveDate,
    /// Last day (inclusive)
    pub end: NaiveDate,
}

/// Per-day series and counters produced by [`run_event_loop`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutput {
    /// Trading days simulated
    pub dates: Vec<NaiveDate>,
    /// Net return per day
    pub daily_returns: Vec<f64>,
    /// Sum of |Δposition| per day
    pub daily_turnover: Vec<f64>,
    /// Gross exposure after the day's rebalance
    pub gross_exposure: Vec<f64>,
    /// Total cost charged, as a return fraction
    pub total_costs: f64,
    /// Total funding charged, as a return fraction
    pub total_funding: f64,
    /// Number of position changes
    pub n_trades: u64,
    /// Mean position episode length in trading days
    pub avg_holding_days: f64,
}

/// Tracks position episodes per instrument to derive the average holding period.
#[derive(Debug, Default)]
struct HoldingTracker {
    open_since: HashMap<String, usize>,
    closed_lengths: Vec<usize>,
}

impl HoldingTracker {
    fn on_change(&mut self, instrument: &str, before: f64, after: f64, day_idx: usize) {
        let was_open = before.abs() > POSITION_EPS;
        let is_open = after.abs() > POSITION_EPS;
        let flipped = was_open && is_open && before.signum() != after.signum();

        if was_open && (!is_open || flipped) {
            if let Some(opened) = self.open_since.remove(instrument) {
                self.closed_lengths.push(day_idx - opened);
            }
        }
        if is_open && (!was_open || flipped) {
            self.open_since.insert(instrument.to_string(), day_idx);
        }
    }

    #[allow(clippy::cast_precision_loss)] // day counts never exceed f64 mantissa precision
    fn average(&self, n_days: usize) -> f64 {
        let lengths: Vec<usize> = self
            .closed_lengths
            .iter()
            .copied()
            .chain(self.open_since.values().map(|opened| n_days - opened))
            .collect();
        if lengths.is_empty() {
            return 0.0;
        }
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    }
}

/// Runs `strategy` day by day over `[params.start, params.end]`.
///
/// # Errors
/// - [`BacktestError::InsufficientData`] when none of the strategy's
///   instruments has a price in range.
/// - [`BacktestError::Cost`] when a traded instrument has no cost rate.
pub fn run_event_loop(
    strategy: &dyn Strategy,
    params: &SimulationParams<'_>,
) -> Result<SimulationOutput, BacktestError> {
    let store = params.store;
    let days = store.trading_days(strategy.instruments(), params.start, params.end);
    if days.is_empty() {
        return Err(BacktestError::InsufficientData {
            strategy: strategy.id().to_string(),
            start: params.start,
            end: params.end,
        });
    }

    tracing::debug!(
        strategy = strategy.id(),
        days = days.len(),
        start = %params.start,
        end = %params.end,
        "starting simulation"
    );

    let daily_funding = params.funding_rate / TRADING_DAYS_PER_YEAR;
    let mut positions: BTreeMap<String, f64> = BTreeMap::new();
    let mut marks: HashMap<String, f64> = HashMap::new();
    let mut holdings = HoldingTracker::default();
    let mut out = SimulationOutput {
        dates: Vec::with_capacity(days.len()),
        daily_returns: Vec::with_capacity(days.len()),
        daily_turnover: Vec::with_capacity(days.len()),
        gross_exposure: Vec::with_capacity(days.len()),
        ..SimulationOutput::default()
    };

    for (day_idx, &day) in days.iter().enumerate() {
        // mark carried positions
        let mut pnl = 0.0;
        let mut carried = 0.0;
        for (instrument, position) in &positions {
            carried += position.abs();
            let Some(price) = store.price(instrument, day) else {
                continue;
            };
            if let Some(mark) = marks.insert(instrument.clone(), price) {
                pnl += position * (price / mark - 1.0);
            }
        }
        let funding = carried * daily_funding;

        // rebalance to today's signals
        let mut cost = 0.0;
        let mut turnover = 0.0;
        let snapshot = store.snapshot(day);
        for signal in strategy.generate_signals(&snapshot) {
            let Some(price) = store.price(&signal.instrument, day) else {
                continue;
            };
            let current = positions.get(&signal.instrument).copied().unwrap_or(0.0);
            let target = signal.target_position();
            let delta = (target - current).abs();
            if !target.is_finite() || delta <= POSITION_EPS {
                continue;
            }

            let bps = params.costs.get_cost_bps(&signal.instrument)?;
            cost += delta * bps / BPS_DENOMINATOR;
            turnover += delta;
            out.n_trades += 1;
            holdings.on_change(&signal.instrument, current, target, day_idx);

            marks.insert(signal.instrument.clone(), price);
            positions.insert(signal.instrument, target);
        }

        out.dates.push(day);
        out.daily_returns.push(pnl - cost - funding);
        out.daily_turnover.push(turnover);
        out.gross_exposure.push(positions.values().map(|p| p.abs()).sum());
        out.total_costs += cost;
        out.total_funding += funding;
    }

    out.avg_holding_days = holdings.average(days.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tessera_data::DataSnapshot;
    use tessera_types::{Direction, StrategySignal};

    struct AlwaysLong {
        instruments: Vec<String>,
    }

    impl Strategy for AlwaysLong {
        fn id(&self) -> &str {
            "always_long"
        }

        fn instruments(&self) -> &[String] {
            &self.instruments
        }

        fn generate_signals(&self, _snapshot: &DataSnapshot<'_>) -> Vec<StrategySignal> {
            self.instruments
                .iter()
                .map(|name| StrategySignal::new(name.clone(), Direction::Long).with_size(1.0))
                .collect()
        }
    }

    /// Long on even days, flat on odd days.
    struct Alternating {
        instruments: Vec<String>,
    }

    impl Strategy for Alternating {
        fn id(&self) -> &str {
            "alternating"
        }

        fn instruments(&self) -> &[String] {
            &self.instruments
        }

        fn generate_signals(&self, snapshot: &DataSnapshot<'_>) -> Vec<StrategySignal> {
            use chrono::Datelike;
            let direction = if snapshot.date().day() % 2 == 0 {
                Direction::Long
            } else {
                Direction::Flat
            };
            vec![
                StrategySignal::new(self.instruments[0].clone(), direction)
                    .with_size(1.0),
            ]
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn params<'a>(store: &'a PriceStore, costs: &'a TransactionCostModel) -> SimulationParams<'a> {
        SimulationParams {
            store,
            costs,
            funding_rate: 0.0,
            start: day(1),
            end: day(31),
        }
    }

    fn long(instrument: &str) -> AlwaysLong {
        AlwaysLong {
            instruments: vec![instrument.to_string()],
        }
    }

    #[test]
    fn test_no_data_is_insufficient() {
        let store = PriceStore::new();
        let costs = TransactionCostModel::new();
        let err = run_event_loop(&long("DI1F26"), &params(&store, &costs)).unwrap_err();
        assert!(matches!(err, BacktestError::InsufficientData { .. }));
    }

    #[test]
    fn test_entry_cost_then_price_pnl() {
        let store = PriceStore::new()
            .with_series("DI1F26", [(day(1), 100.0), (day(2), 101.0), (day(3), 99.99)])
            .unwrap();
        let costs = TransactionCostModel::new();
        let out = run_event_loop(&long("DI1F26"), &params(&store, &costs)).unwrap();

        assert_eq!(out.dates, vec![day(1), day(2), day(3)]);
        assert_relative_eq!(out.daily_returns[0], -0.0002, epsilon = 1e-12);
        assert_relative_eq!(out.daily_returns[1], 0.01, epsilon = 1e-12);
        assert_relative_eq!(out.daily_returns[2], -0.01, epsilon = 1e-12);
        assert_eq!(out.daily_turnover, vec![1.0, 0.0, 0.0]);
        assert_eq!(out.gross_exposure, vec![1.0, 1.0, 1.0]);
        assert_eq!(out.n_trades, 1);
        assert_relative_eq!(out.avg_holding_days, 3.0);
    }

    #[test]
    fn test_gap_realizes_on_resume() {
        let store = PriceStore::new()
            .with_series("DOLQ24", [(day(1), 5.0), (day(4), 5.5)])
            .unwrap()
            .with_series(
                "DI1F26",
                [(day(1), 100.0), (day(2), 100.0), (day(3), 100.0), (day(4), 100.0)],
            )
            .unwrap();
        let costs = TransactionCostModel::new()
            .with_override("DOL", 0.0)
            .and_then(|model| model.with_override("DI1", 0.0))
            .unwrap();
        let strategy = AlwaysLong {
            instruments: vec!["DOLQ24".to_string(), "DI1F26".to_string()],
        };
        let out = run_event_loop(&strategy, &params(&store, &costs)).unwrap();

        assert_eq!(out.dates.len(), 4);
        // no DOL price on days 2 and 3
        assert!(out.daily_returns[1].abs() < 1e-12);
        assert!(out.daily_returns[2].abs() < 1e-12);
        assert_relative_eq!(out.daily_returns[3], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_funding_on_carried_exposure() {
        let store = PriceStore::new()
            .with_series("LTN", [(day(1), 100.0), (day(2), 100.0)])
            .unwrap();
        let costs = TransactionCostModel::new().with_override("LTN", 0.0).unwrap();
        let mut p = params(&store, &costs);
        p.funding_rate = 0.252;
        let out = run_event_loop(&long("LTN"), &p).unwrap();

        // nothing carried into day 1
        assert!(out.daily_returns[0].abs() < 1e-12);
        assert_relative_eq!(out.daily_returns[1], -0.001, epsilon = 1e-12);
        assert_relative_eq!(out.total_funding, 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_alternating_trades_and_holding() {
        let series: Vec<(NaiveDate, f64)> = (1..=6).map(|d| (day(d), 100.0)).collect();
        let store = PriceStore::new().with_series("WINQ24", series).unwrap();
        let costs = TransactionCostModel::new();
        let strategy = Alternating {
            instruments: vec!["WINQ24".to_string()],
        };
        let out = run_event_loop(&strategy, &params(&store, &costs)).unwrap();

        // day 1 flat (no trade), opens on 2, 4, 6 and closes on 3, 5
        assert_eq!(out.n_trades, 5);
        assert_eq!(out.daily_turnover, vec![0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        // two closed one-day episodes plus one open since the last day
        assert_relative_eq!(out.avg_holding_days, 1.0);
        assert_relative_eq!(out.total_costs, 5.0 * 2.0 / 10_000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_cost_instrument_fails() {
        let store = PriceStore::new()
            .with_series("XAUUSD", [(day(1), 2000.0)])
            .unwrap();
        let costs = TransactionCostModel::new();
        let err = run_event_loop(&long("XAUUSD"), &params(&store, &costs)).unwrap_err();
        assert!(matches!(err, BacktestError::Cost(_)));
    }

    #[test]
    fn test_holding_tracker_flip() {
        let mut tracker = HoldingTracker::default();
        tracker.on_change("DI1", 0.0, 1.0, 0);
        tracker.on_change("DI1", 1.0, 0.5, 2);
        tracker.on_change("DI1", 0.5, -1.0, 4);
        tracker.on_change("DI1", -1.0, 0.0, 5);
        // episodes: [0, 4) and [4, 5)
        assert_relative_eq!(tracker.average(10), 2.5);
    }
}
