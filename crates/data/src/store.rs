//! Per-instrument price histories.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::DataError;
use crate::snapshot::DataSnapshot;

/// One observation in the JSON payload accepted by [`PriceStore::from_json`].
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRow {
    /// Instrument ticker.
    pub instrument: String,
    /// Observation date.
    pub date: NaiveDate,
    /// Close price (or index level).
    pub price: f64,
}

/// Price histories keyed by instrument, each ordered by date.
///
/// Dates without an observation are simply absent; the engine treats them as
/// "no data that day" rather than as an error.
#[derive(Debug, Clone, Default)]
pub struct PriceStore {
    series: HashMap<String, BTreeMap<NaiveDate, f64>>,
}

impl PriceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a single observation, replacing any existing price that day.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidPrice`] for non-finite or non-positive prices.
    pub fn insert(
        &mut self,
        instrument: &str,
        date: NaiveDate,
        price: f64,
    ) -> Result<(), DataError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(DataError::InvalidPrice {
                instrument: instrument.to_string(),
                date,
                price,
            });
        }
        self.series
            .entry(instrument.to_string())
            .or_default()
            .insert(date, price);
        Ok(())
    }

    /// Adds a whole series for one instrument.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidPrice`] on the first invalid observation.
    pub fn with_series<I>(mut self, instrument: &str, points: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        for (date, price) in points {
            self.insert(instrument, date, price)?;
        }
        Ok(self)
    }

    /// Builds a store from a JSON array of [`PriceRow`]s.
    ///
    /// # Errors
    /// - [`DataError::Parse`] when the payload is not a valid row array.
    /// - [`DataError::InvalidPrice`] for invalid observations.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let rows: Vec<PriceRow> =
            serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))?;
        let mut store = Self::new();
        for row in rows {
            store.insert(&row.instrument, row.date, row.price)?;
        }
        Ok(store)
    }

    /// Returns all known instruments, sorted.
    #[must_use]
    pub fn instruments(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the full history for an instrument.
    #[must_use]
    pub fn series(&self, instrument: &str) -> Option<&BTreeMap<NaiveDate, f64>> {
        self.series.get(instrument)
    }

    /// Returns the price on an exact date.
    #[must_use]
    pub fn price(&self, instrument: &str, date: NaiveDate) -> Option<f64> {
        self.series.get(instrument)?.get(&date).copied()
    }

    /// Observations for `instrument` within `[start, end]`.
    #[must_use]
    pub fn range(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<(NaiveDate, f64)> {
        if start > end {
            return Vec::new();
        }
        self.series
            .get(instrument)
            .map(|s| s.range(start..=end).map(|(d, p)| (*d, *p)).collect())
            .unwrap_or_default()
    }

    /// Sorted union of dates within `[start, end]` on which any of
    /// `instruments` has a price.
    #[must_use]
    pub fn trading_days<S: AsRef<str>>(
        &self,
        instruments: &[S],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        let days: BTreeSet<NaiveDate> = instruments
            .iter()
            .filter_map(|name| self.series.get(name.as_ref()))
            .flat_map(|s| s.range(start..=end).map(|(d, _)| *d))
            .collect();
        days.into_iter().collect()
    }

    /// Returns `true` if any instrument has at least one price in range.
    #[must_use]
    pub fn has_data<S: AsRef<str>>(
        &self,
        instruments: &[S],
        start: NaiveDate,
        end: NaiveDate,
    ) -> bool {
        start <= end
            && instruments.iter().any(|name| {
                self.series
                    .get(name.as_ref())
                    .is_some_and(|s| s.range(start..=end).next().is_some())
            })
    }

    /// Earliest and latest observation dates across all instruments.
    #[must_use]
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.series.values().filter_map(|s| s.keys().next()).min()?;
        let last = self
            .series
            .values()
            .filter_map(|s| s.keys().next_back())
            .max()?;
        Some((*first, *last))
    }

    /// Point-in-time view as of `date` (inclusive).
    #[must_use]
    pub fn snapshot(&self, date: NaiveDate) -> DataSnapshot<'_> {
        DataSnapshot::new(self, date)
    }

    /// Returns `true` if the store holds no instruments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample_store() -> PriceStore {
        PriceStore::new()
            .with_series("DI1F26", [(day(1), 100.0), (day(4), 101.0), (day(5), 102.0)])
            .unwrap()
            .with_series("WDO", [(day(1), 5.0), (day(2), 5.1)])
            .unwrap()
    }

    #[test]
    fn test_insert_rejects_invalid_price() {
        let mut store = PriceStore::new();
        assert!(matches!(
            store.insert("DI1", day(1), f64::NAN),
            Err(DataError::InvalidPrice { .. })
        ));
        assert!(store.insert("DI1", day(1), 0.0).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_trading_days_union() {
        let store = sample_store();
        let days = store.trading_days(&["DI1F26", "WDO"], day(1), day(5));
        assert_eq!(days, vec![day(1), day(2), day(4), day(5)]);

        let days = store.trading_days(&["DI1F26"], day(2), day(4));
        assert_eq!(days, vec![day(4)]);
    }

    #[test]
    fn test_has_data() {
        let store = sample_store();
        assert!(store.has_data(&["WDO"], day(2), day(3)));
        assert!(!store.has_data(&["WDO"], day(3), day(31)));
        assert!(!store.has_data(&["UNKNOWN"], day(1), day(31)));
        assert!(!store.has_data(&["WDO"], day(5), day(1)));
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"instrument": "IND", "date": "2024-03-01", "price": 128000.0},
            {"instrument": "IND", "date": "2024-03-04", "price": 128500.0}
        ]"#;
        let store = PriceStore::from_json(json).unwrap();
        assert_eq!(store.instruments(), vec!["IND"]);
        assert_eq!(store.range("IND", day(1), day(31)).len(), 2);

        assert!(matches!(
            PriceStore::from_json("{}"),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn test_date_bounds() {
        assert_eq!(sample_store().date_bounds(), Some((day(1), day(5))));
        assert_eq!(PriceStore::new().date_bounds(), None);
    }
}
