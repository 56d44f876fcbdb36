//! Flat persistence record for the append-only results table.
//!
//! Series and parameters are stored as JSON blobs; summary statistics are
//! duplicated as plain columns so the table can be queried without decoding.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;
use crate::portfolio::PortfolioBacktestResult;
use crate::result::{BacktestResult, EquityPoint, Metrics};

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BacktestRecord {
    /// Strategy (or portfolio) identifier
    pub strategy_id: String,
    /// Serialized configuration blob
    pub parameters: String,
    /// Serialized `[DailyRow]` blob
    pub daily_returns: String,
    /// Serialized full metrics blob
    pub metrics: String,
    /// Run completion time
    pub run_timestamp: DateTime<Utc>,
    /// Average holding period in days
    pub avg_holding_days: f64,
    /// Annualized Sharpe ratio
    pub sharpe: f64,
    /// Maximum drawdown
    pub max_drawdown: f64,
    /// Compounded total return
    pub total_return: f64,
    /// Mean daily turnover
    pub turnover: f64,
}

/// One day inside the `daily_returns` blob.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DailyRow {
    /// Trading day
    pub date: NaiveDate,
    /// Net return
    pub ret: f64,
    /// Turnover on the day
    #[serde(default)]
    pub turnover: f64,
    /// Gross exposure at the close
    #[serde(default)]
    pub exposure: f64,
}

impl BacktestResult {
    /// Serializes this result into a persistence record.
    ///
    /// # Errors
    /// Returns [`CoreError::Serialization`] if a blob cannot be encoded.
    pub fn to_record(&self) -> Result<BacktestRecord, CoreError> {
        let rows: Vec<DailyRow> = self
            .dates
            .iter()
            .enumerate()
            .map(|(idx, date)| DailyRow {
                date: *date,
                ret: self.daily_returns.get(idx).copied().unwrap_or(0.0),
                turnover: self.daily_turnover.get(idx).copied().unwrap_or(0.0),
                exposure: self.gross_exposure.get(idx).copied().unwrap_or(0.0),
            })
            .collect();

        Ok(BacktestRecord {
            strategy_id: self.strategy_id.clone(),
            parameters: serde_json::to_string(&self.config)?,
            daily_returns: serde_json::to_string(&rows)?,
            metrics: serde_json::to_string(&self.metrics)?,
            run_timestamp: self.run_timestamp,
            avg_holding_days: self.metrics.avg_holding_days,
            sharpe: self.metrics.sharpe,
            max_drawdown: self.metrics.max_drawdown,
            total_return: self.metrics.total_return,
            turnover: self.metrics.turnover,
        })
    }

    /// Reconstructs a result from a persistence record.
    ///
    /// The equity curve is recompounded from `initial_capital` in the
    /// parameters blob.
    ///
    /// # Errors
    /// - [`CoreError::Serialization`] when a blob cannot be decoded.
    /// - [`CoreError::InvalidRecord`] when `initial_capital` is missing.
    pub fn from_record(record: &BacktestRecord) -> Result<Self, CoreError> {
        let config: serde_json::Value = serde_json::from_str(&record.parameters)?;
        let rows: Vec<DailyRow> = serde_json::from_str(&record.daily_returns)?;
        let metrics: Metrics = serde_json::from_str(&record.metrics)?;

        let initial_capital = config
            .get("initial_capital")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                CoreError::InvalidRecord(format!(
                    "parameters for {} carry no initial_capital",
                    record.strategy_id
                ))
            })?;

        let dates: Vec<NaiveDate> = rows.iter().map(|row| row.date).collect();
        let daily_returns: Vec<f64> = rows.iter().map(|row| row.ret).collect();
        let equity_curve = EquityPoint::curve_from_returns(initial_capital, &dates, &daily_returns);

        Ok(Self {
            strategy_id: record.strategy_id.clone(),
            daily_turnover: rows.iter().map(|row| row.turnover).collect(),
            gross_exposure: rows.iter().map(|row| row.exposure).collect(),
            dates,
            daily_returns,
            equity_curve,
            metrics,
            config,
            run_timestamp: record.run_timestamp,
        })
    }
}

impl PortfolioBacktestResult {
    /// Serializes the combined result followed by every individual result
    /// (sorted by strategy id).
    ///
    /// # Errors
    /// Returns [`CoreError::Serialization`] if any blob cannot be encoded.
    pub fn to_records(&self) -> Result<Vec<BacktestRecord>, CoreError> {
        std::iter::once(&self.combined)
            .chain(self.individual.values())
            .map(BacktestResult::to_record)
            .collect()
    }
}
