//! Backtest engine orchestration.
//!
//! A run moves through validate → simulate → aggregate → finalize; nothing
//! in between is observable. The engine holds only immutable state, so
//! portfolio members and walk-forward windows run in parallel on rayon.

use std::time::Instant;

use chrono::NaiveDate;
use rayon::prelude::*;
use tessera_data::PriceStore;
use tessera_strategy::Strategy;
use tessera_types::{
    BacktestResult, PortfolioBacktestResult, WalkForwardReport, WalkForwardWindow,
};

use crate::config::{BacktestConfig, WalkForwardConfig};
use crate::error::BacktestError;
use crate::event_loop::{SimulationParams, run_event_loop};
use crate::portfolio::{combine_results, normalize_weights};
use crate::result_builder::{build_result, config_blob};
use crate::walk_forward::{WindowBounds, generate_windows, score_window};

/// Backtest engine bound to a validated config and a price history.
#[derive(Debug, Clone)]
pub struct BacktestEngine {
    config: BacktestConfig,
    store: PriceStore,
}

impl BacktestEngine {
    /// Creates a new engine.
    ///
    /// A price history that does not span the configured range is accepted
    /// with a warning; uncovered days are simply not simulated.
    ///
    /// # Errors
    /// Returns [`BacktestError::Configuration`] if the config is invalid.
    pub fn new(config: BacktestConfig, store: PriceStore) -> Result<Self, BacktestError> {
        config.validate()?;
        let engine = Self { config, store };
        if !engine.covers_range() {
            let bounds = engine.store.date_bounds();
            tracing::warn!(
                start = %engine.config.start_date,
                end = %engine.config.end_date,
                first_price = ?bounds.map(|(first, _)| first),
                last_price = ?bounds.map(|(_, last)| last),
                "price history does not cover the backtest range"
            );
        }
        Ok(engine)
    }

    /// Returns `true` when the price history spans the configured range.
    #[must_use]
    pub fn covers_range(&self) -> bool {
        self.store.date_bounds().is_some_and(|(first, last)| {
            first <= self.config.start_date && last >= self.config.end_date
        })
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Price history the engine simulates against.
    #[must_use]
    pub fn store(&self) -> &PriceStore {
        &self.store
    }

    /// Simulates one strategy over the configured date range.
    ///
    /// # Errors
    /// - [`BacktestError::InsufficientData`] when the range holds no prices
    ///   for any of the strategy's instruments.
    /// - [`BacktestError::Cost`] when a traded instrument has no cost rate.
    pub fn run(&self, strategy: &dyn Strategy) -> Result<BacktestResult, BacktestError> {
        self.run_range(strategy, self.config.start_date, self.config.end_date)
    }

    fn run_range(
        &self,
        strategy: &dyn Strategy,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BacktestResult, BacktestError> {
        let started = Instant::now();
        let params = SimulationParams {
            store: &self.store,
            costs: &self.config.cost_model,
            funding_rate: self.config.funding_rate,
            start,
            end,
        };
        let output = run_event_loop(strategy, &params)?;
        let blob = config_blob(&self.config.for_range(start, end))?;
        let result = build_result(strategy.id(), output, self.config.initial_capital, blob);

        tracing::info!(
            strategy = strategy.id(),
            days = result.len(),
            sharpe = result.metrics.sharpe,
            total_return = result.metrics.total_return,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "backtest finished"
        );
        Ok(result)
    }

    /// Runs every strategy independently and blends the results.
    ///
    /// `weights` default to equal weighting and are normalized to sum to 1.
    ///
    /// # Errors
    /// - [`BacktestError::Configuration`] for an empty strategy list,
    ///   duplicate ids, or invalid weights.
    /// - Any error from [`BacktestEngine::run`] for an individual strategy.
    pub fn run_portfolio(
        &self,
        strategies: &[Box<dyn Strategy>],
        weights: Option<&[f64]>,
    ) -> Result<PortfolioBacktestResult, BacktestError> {
        let weights = normalize_weights(strategies.len(), weights)?;

        tracing::info!(strategies = strategies.len(), "starting portfolio backtest");
        let results = strategies
            .par_iter()
            .map(|strategy| self.run(strategy.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let portfolio = combine_results(
            results,
            &weights,
            self.config.initial_capital,
            config_blob(&self.config)?,
        )?;

        tracing::info!(
            strategies = strategies.len(),
            sharpe = portfolio.combined.metrics.sharpe,
            total_return = portfolio.attribution.total_return,
            "portfolio backtest finished"
        );
        Ok(portfolio)
    }

    /// Walk-forward validation with the step equal to `test_months`.
    ///
    /// # Errors
    /// - [`BacktestError::Configuration`] for zero lengths or a range too
    ///   short for a single window.
    /// - Any non-data error raised while simulating a window.
    pub fn walk_forward_validation(
        &self,
        strategy: &dyn Strategy,
        train_months: u32,
        test_months: u32,
    ) -> Result<WalkForwardReport, BacktestError> {
        self.walk_forward_with(strategy, &WalkForwardConfig::new(train_months, test_months))
    }

    /// Walk-forward validation using `config.walk_forward`.
    ///
    /// # Errors
    /// Returns [`BacktestError::Configuration`] when no walk-forward windows
    /// are configured, otherwise as [`BacktestEngine::walk_forward_validation`].
    pub fn run_walk_forward(
        &self,
        strategy: &dyn Strategy,
    ) -> Result<WalkForwardReport, BacktestError> {
        let windows = self.config.walk_forward.ok_or_else(|| {
            BacktestError::Configuration("walk_forward is not configured".to_string())
        })?;
        self.walk_forward_with(strategy, &windows)
    }

    /// Walk-forward validation with explicit window lengths.
    ///
    /// # Errors
    /// As [`BacktestEngine::walk_forward_validation`].
    pub fn walk_forward_with(
        &self,
        strategy: &dyn Strategy,
        windows: &WalkForwardConfig,
    ) -> Result<WalkForwardReport, BacktestError> {
        let bounds = generate_windows(self.config.start_date, self.config.end_date, windows)?;

        tracing::info!(
            strategy = strategy.id(),
            windows = bounds.len(),
            train_months = windows.train_months,
            test_months = windows.test_months,
            "starting walk-forward validation"
        );

        let scored = bounds
            .par_iter()
            .map(|window| self.evaluate_window(strategy, window))
            .collect::<Result<Vec<_>, _>>()?;

        let report = WalkForwardReport::from_windows(strategy.id(), scored);
        tracing::info!(
            strategy = strategy.id(),
            mean_in_sample_sharpe = report.mean_in_sample_sharpe,
            mean_out_of_sample_sharpe = report.mean_out_of_sample_sharpe,
            flagged_windows = report.flagged_windows,
            "walk-forward validation finished"
        );
        Ok(report)
    }

    fn evaluate_window(
        &self,
        strategy: &dyn Strategy,
        window: &WindowBounds,
    ) -> Result<WalkForwardWindow, BacktestError> {
        let in_sample =
            self.segment_sharpe(strategy, window, window.train_start, window.train_last())?;
        let out_of_sample =
            self.segment_sharpe(strategy, window, window.test_start, window.test_last())?;
        Ok(score_window(
            strategy.id(),
            window,
            in_sample,
            out_of_sample,
            self.config.overfit_warning_threshold,
        ))
    }

    /// Sharpe over one segment; a segment without prices scores 0.0.
    fn segment_sharpe(
        &self,
        strategy: &dyn Strategy,
        window: &WindowBounds,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, BacktestError> {
        match self.run_range(strategy, start, end) {
            Ok(result) => Ok(result.metrics.sharpe),
            Err(BacktestError::InsufficientData { .. }) => {
                tracing::warn!(
                    strategy = strategy.id(),
                    window = window.index,
                    start = %start,
                    end = %end,
                    "no data in walk-forward segment, scoring 0.0"
                );
                Ok(0.0)
            }
            Err(err) => Err(err),
        }
    }
}
