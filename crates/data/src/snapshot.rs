//! Point-in-time view over a [`PriceStore`].

use chrono::NaiveDate;

use crate::store::PriceStore;

/// Read-only view of the price store as of a given date.
///
/// Only observations dated on or before [`DataSnapshot::date`] are visible,
/// which keeps strategies free of lookahead.
#[derive(Debug, Clone, Copy)]
pub struct DataSnapshot<'a> {
    store: &'a PriceStore,
    date: NaiveDate,
}

impl<'a> DataSnapshot<'a> {
    /// Creates a snapshot as of `date`.
    #[must_use]
    pub fn new(store: &'a PriceStore, date: NaiveDate) -> Self {
        Self { store, date }
    }

    /// Evaluation date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Most recent price on or before the snapshot date.
    #[must_use]
    pub fn latest_price(&self, instrument: &str) -> Option<f64> {
        self.store
            .series(instrument)?
            .range(..=self.date)
            .next_back()
            .map(|(_, p)| *p)
    }

    /// Up to `lookback` most recent prices, oldest first.
    #[must_use]
    pub fn history(&self, instrument: &str, lookback: usize) -> Vec<f64> {
        let Some(series) = self.store.series(instrument) else {
            return Vec::new();
        };
        let mut prices: Vec<f64> = series
            .range(..=self.date)
            .rev()
            .take(lookback)
            .map(|(_, p)| *p)
            .collect();
        prices.reverse();
        prices
    }

    /// Up to `lookback` most recent simple returns, oldest first.
    #[must_use]
    pub fn returns(&self, instrument: &str, lookback: usize) -> Vec<f64> {
        let prices = self.history(instrument, lookback.saturating_add(1));
        prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
    }
}
