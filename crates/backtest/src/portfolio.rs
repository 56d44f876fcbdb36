//! Portfolio combination of independent strategy results.
//!
//! Individual return series are aligned on the union of their dates with
//! missing days as zero, then blended with normalized weights.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde_json::Value;
use tessera_analytics::stats::correlation;
use tessera_types::{BacktestResult, CorrelationMatrix, PnlAttribution, PortfolioBacktestResult};

use crate::error::BacktestError;
use crate::event_loop::SimulationOutput;
use crate::result_builder::build_result;

/// Label of the blended series.
pub const PORTFOLIO_ID: &str = "portfolio";

/// Validates and normalizes weights for `n` strategies.
///
/// `None` means equal weighting.
///
/// # Errors
/// Returns [`BacktestError::Configuration`] when `n` is zero, the weight
/// count differs from `n`, any weight is negative or non-finite, or the
/// weights sum to zero.
#[allow(clippy::cast_precision_loss)]
pub fn normalize_weights(n: usize, weights: Option<&[f64]>) -> Result<Vec<f64>, BacktestError> {
    if n == 0 {
        return Err(BacktestError::Configuration(
            "portfolio needs at least one strategy".to_string(),
        ));
    }
    let Some(weights) = weights else {
        return Ok(vec![1.0 / n as f64; n]);
    };

    if weights.len() != n {
        return Err(BacktestError::Configuration(format!(
            "got {} weights for {n} strategies",
            weights.len()
        )));
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(BacktestError::Configuration(format!(
            "weights must be finite and non-negative, got {bad}"
        )));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(BacktestError::Configuration(
            "weights sum to zero".to_string(),
        ));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Blends individual results into a [`PortfolioBacktestResult`].
///
/// `weights` must already be normalized and in the same order as `results`.
/// The combined result's config is `config` with a `weights` map added.
///
/// # Errors
/// Returns [`BacktestError::Configuration`] for an empty or mismatched input
/// or duplicate strategy ids.
pub fn combine_results(
    results: Vec<BacktestResult>,
    weights: &[f64],
    initial_capital: f64,
    mut config: Value,
) -> Result<PortfolioBacktestResult, BacktestError> {
    if results.is_empty() || results.len() != weights.len() {
        return Err(BacktestError::Configuration(format!(
            "cannot combine {} results with {} weights",
            results.len(),
            weights.len()
        )));
    }
    if let Some(dup) = first_duplicate(&results) {
        return Err(BacktestError::Configuration(format!(
            "duplicate strategy id in portfolio: {dup}"
        )));
    }

    let dates: Vec<NaiveDate> = results
        .iter()
        .flat_map(|r| r.dates.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let aligned_returns: Vec<Vec<f64>> = results
        .iter()
        .map(|r| align(&dates, &r.dates, &r.daily_returns))
        .collect();

    let blend = |series: &[Vec<f64>]| -> Vec<f64> {
        (0..dates.len())
            .map(|t| series.iter().zip(weights).map(|(s, w)| w * s[t]).sum())
            .collect()
    };
    let daily_returns = blend(&aligned_returns);
    let daily_turnover = blend(
        &results
            .iter()
            .map(|r| align(&dates, &r.dates, &r.daily_turnover))
            .collect::<Vec<_>>(),
    );
    let gross_exposure = blend(
        &results
            .iter()
            .map(|r| align(&dates, &r.dates, &r.gross_exposure))
            .collect::<Vec<_>>(),
    );

    let weighted = |f: fn(&BacktestResult) -> f64| -> f64 {
        results.iter().zip(weights).map(|(r, w)| w * f(r)).sum()
    };

    let attribution = PnlAttribution {
        contributions: results
            .iter()
            .zip(weights)
            .zip(&aligned_returns)
            .map(|((r, w), series)| (r.strategy_id.clone(), w * series.iter().sum::<f64>()))
            .collect(),
        total_return: daily_returns.iter().sum(),
    };

    let correlation = correlation_matrix(
        results.iter().map(|r| r.strategy_id.clone()).collect(),
        &aligned_returns,
    );

    let weight_map: BTreeMap<String, f64> = results
        .iter()
        .zip(weights)
        .map(|(r, w)| (r.strategy_id.clone(), *w))
        .collect();
    if let Value::Object(map) = &mut config {
        map.insert("weights".to_string(), serde_json::json!(weight_map));
    }

    let output = SimulationOutput {
        total_costs: weighted(|r| r.metrics.total_costs),
        total_funding: weighted(|r| r.metrics.total_funding),
        avg_holding_days: weighted(|r| r.metrics.avg_holding_days),
        n_trades: results.iter().map(|r| r.metrics.n_trades).sum(),
        dates,
        daily_returns,
        daily_turnover,
        gross_exposure,
    };
    let combined = build_result(PORTFOLIO_ID, output, initial_capital, config);

    Ok(PortfolioBacktestResult {
        combined,
        individual: results
            .into_iter()
            .map(|r| (r.strategy_id.clone(), r))
            .collect(),
        weights: weight_map,
        correlation,
        attribution,
    })
}

/// Pearson correlation matrix with a unit diagonal.
#[must_use]
pub fn correlation_matrix(labels: Vec<String>, series: &[Vec<f64>]) -> CorrelationMatrix {
    let values = (0..series.len())
        .map(|i| {
            (0..series.len())
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        correlation(&series[i], &series[j])
                    }
                })
                .collect()
        })
        .collect();
    CorrelationMatrix { labels, values }
}

fn first_duplicate(results: &[BacktestResult]) -> Option<String> {
    let mut seen = HashSet::new();
    results
        .iter()
        .find(|r| !seen.insert(r.strategy_id.as_str()))
        .map(|r| r.strategy_id.clone())
}

/// Reindexes `values` (keyed by `own_dates`) onto `dates`, filling gaps with 0.0.
fn align(dates: &[NaiveDate], own_dates: &[NaiveDate], values: &[f64]) -> Vec<f64> {
    let by_date: HashMap<NaiveDate, f64> = own_dates
        .iter()
        .copied()
        .zip(values.iter().copied())
        .collect();
    dates
        .iter()
        .map(|d| by_date.get(d).copied().unwrap_or(0.0))
        .collect()
}
