//! Tearsheet assembly.
//!
//! A [`Tearsheet`] is a pure reshaping of a [`BacktestResult`] through the
//! analytics functions of this crate, split into seven serializable sections.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tessera_types::{BacktestResult, EquityPoint, Metrics};

use crate::deflated::deflated_sharpe;
use crate::drawdown::compute_drawdown;
use crate::ratios::{compute_information_ratio, compute_sortino, compute_tail_ratio};
use crate::rolling::compute_rolling_sharpe;
use crate::stats::{kurtosis, mean, per_period_sharpe, percentile, skewness, std_dev};
use crate::turnover::compute_turnover;

/// Knobs for [`generate_tearsheet_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TearsheetOptions {
    /// Configurations tried before picking this one (deflates the Sharpe)
    pub n_trials: u64,
    /// Rolling Sharpe window in trading days
    pub rolling_window: usize,
    /// Histogram buckets of the return distribution
    pub histogram_buckets: usize,
}

impl Default for TearsheetOptions {
    fn default() -> Self {
        Self {
            n_trials: 1,
            rolling_window: 63,
            histogram_buckets: 20,
        }
    }
}

/// Structured report of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tearsheet {
    /// Headline statistics
    pub summary: TearsheetSummary,
    /// Equity curve as produced by the run
    pub equity_curve: Vec<EquityPoint>,
    /// Underwater curve and its extremes
    pub drawdown: DrawdownSection,
    /// Compounded return per calendar month
    pub monthly_returns: Vec<MonthlyReturn>,
    /// Trailing Sharpe series
    pub rolling_sharpe: RollingSharpeSection,
    /// Position activity
    pub trade_analysis: TradeAnalysis,
    /// Shape of the daily return distribution
    pub return_distribution: ReturnDistribution,
}

/// Headline statistics section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TearsheetSummary {
    /// Strategy or portfolio label
    pub strategy_id: String,
    /// First simulated day
    pub start_date: Option<NaiveDate>,
    /// Last simulated day
    pub end_date: Option<NaiveDate>,
    /// Metrics recorded by the run
    pub metrics: Metrics,
    /// Annualized Sortino ratio
    pub sortino: f64,
    /// Annualized information ratio against a zero benchmark
    pub information_ratio: f64,
    /// `|p95| / |p5|`
    pub tail_ratio: f64,
    /// Deflated Sharpe probability
    pub deflated_sharpe: f64,
    /// Trial count fed to the Deflated Sharpe
    pub n_trials: u64,
}

/// Drawdown section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSection {
    /// Per-day drawdown from the high water mark
    pub series: Vec<(NaiveDate, f64)>,
    /// Maximum relative drawdown
    pub max_drawdown: f64,
    /// Maximum absolute drawdown
    pub max_drawdown_abs: f64,
    /// Longest drawdown in trading days
    pub max_duration_days: u64,
}

/// Compounded return of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    /// Calendar year
    pub year: i32,
    /// Calendar month (1-12)
    pub month: u32,
    /// Compounded return
    pub ret: f64,
}

/// Rolling Sharpe section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingSharpeSection {
    /// Window length in trading days
    pub window: usize,
    /// Last day of each window
    pub dates: Vec<NaiveDate>,
    /// Annualized Sharpe of each window
    pub values: Vec<f64>,
}

/// Position activity section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeAnalysis {
    /// Number of position changes
    pub n_trades: u64,
    /// Mean daily turnover
    pub turnover: f64,
    /// Average position episode length in trading days
    pub avg_holding_days: f64,
    /// Share of non-zero days with a positive return
    pub hit_rate: f64,
    /// Best daily return
    pub best_day: f64,
    /// Worst daily return
    pub worst_day: f64,
    /// Mean gross exposure
    pub avg_gross_exposure: f64,
}

/// Histogram bucket `[lower, upper)`; the last bucket is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Lower edge
    pub lower: f64,
    /// Upper edge
    pub upper: f64,
    /// Observations in the bucket
    pub count: u64,
}

/// Return distribution section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnDistribution {
    /// Equal-width histogram over `[min, max]`
    pub histogram: Vec<HistogramBucket>,
    /// Mean daily return
    pub mean: f64,
    /// Sample standard deviation of daily returns
    pub std_dev: f64,
    /// Population skewness
    pub skewness: f64,
    /// Pearson kurtosis
    pub kurtosis: f64,
    /// 5th percentile
    pub p5: f64,
    /// Median
    pub p50: f64,
    /// 95th percentile
    pub p95: f64,
}

/// Builds a tearsheet with default options (single trial, 63-day window).
#[must_use]
pub fn generate_tearsheet(result: &BacktestResult) -> Tearsheet {
    generate_tearsheet_with(result, &TearsheetOptions::default())
}

/// Builds a tearsheet with explicit options.
#[must_use]
pub fn generate_tearsheet_with(result: &BacktestResult, options: &TearsheetOptions) -> Tearsheet {
    let returns = result.daily_returns.as_slice();
    let skew = skewness(returns);
    let kurt = kurtosis(returns);

    let summary = TearsheetSummary {
        strategy_id: result.strategy_id.clone(),
        start_date: result.dates.first().copied(),
        end_date: result.dates.last().copied(),
        metrics: result.metrics.clone(),
        sortino: compute_sortino(returns),
        information_ratio: compute_information_ratio(returns, None),
        tail_ratio: compute_tail_ratio(returns),
        deflated_sharpe: deflated_sharpe(
            per_period_sharpe(returns),
            options.n_trials.max(1),
            returns.len() as u64,
            skew,
            kurt,
        ),
        n_trials: options.n_trials.max(1),
    };

    let dd = compute_drawdown(&result.equity_curve);
    let drawdown = DrawdownSection {
        series: crate::drawdown::drawdown_series(&result.equity_curve),
        max_drawdown: dd.max_drawdown,
        max_drawdown_abs: dd.max_drawdown_abs,
        max_duration_days: dd.max_duration_days,
    };

    let values = compute_rolling_sharpe(returns, options.rolling_window);
    let rolling_sharpe = RollingSharpeSection {
        window: options.rolling_window,
        dates: result
            .dates
            .iter()
            .skip(options.rolling_window.saturating_sub(1))
            .take(values.len())
            .copied()
            .collect(),
        values,
    };

    Tearsheet {
        summary,
        equity_curve: result.equity_curve.clone(),
        drawdown,
        monthly_returns: monthly_returns(result),
        rolling_sharpe,
        trade_analysis: trade_analysis(result),
        return_distribution: ReturnDistribution {
            histogram: histogram(returns, options.histogram_buckets),
            mean: mean(returns),
            std_dev: std_dev(returns),
            skewness: skew,
            kurtosis: kurt,
            p5: percentile(returns, 5.0),
            p50: percentile(returns, 50.0),
            p95: percentile(returns, 95.0),
        },
    }
}

fn monthly_returns(result: &BacktestResult) -> Vec<MonthlyReturn> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for (date, ret) in result.dated_returns() {
        let growth = months.entry((date.year(), date.month())).or_insert(1.0);
        *growth *= 1.0 + ret;
    }
    months
        .into_iter()
        .map(|((year, month), growth)| MonthlyReturn {
            year,
            month,
            ret: growth - 1.0,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn trade_analysis(result: &BacktestResult) -> TradeAnalysis {
    let returns = &result.daily_returns;
    let active: Vec<f64> = returns.iter().copied().filter(|r| r.abs() > f64::EPSILON).collect();
    let hit_rate = if active.is_empty() {
        0.0
    } else {
        active.iter().filter(|r| **r > 0.0).count() as f64 / active.len() as f64
    };

    TradeAnalysis {
        n_trades: result.metrics.n_trades,
        turnover: compute_turnover(&result.daily_turnover),
        avg_holding_days: result.metrics.avg_holding_days,
        hit_rate,
        best_day: returns.iter().copied().reduce(f64::max).unwrap_or(0.0),
        worst_day: returns.iter().copied().reduce(f64::min).unwrap_or(0.0),
        avg_gross_exposure: mean(&result.gross_exposure),
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn histogram(returns: &[f64], buckets: usize) -> Vec<HistogramBucket> {
    let finite: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    if finite.is_empty() || buckets == 0 {
        return Vec::new();
    }
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // single bucket when every return is identical
    if hi - lo <= f64::EPSILON {
        return vec![HistogramBucket {
            lower: lo,
            upper: hi,
            count: finite.len() as u64,
        }];
    }

    let width = (hi - lo) / buckets as f64;
    let mut counts = vec![0u64; buckets];
    for r in &finite {
        let idx = (((r - lo) / width) as usize).min(buckets - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBucket {
            lower: lo + width * i as f64,
            upper: if i + 1 == buckets { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}
