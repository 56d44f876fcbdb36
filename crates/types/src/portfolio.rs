//! Multi-strategy portfolio result types.

use std::collections::BTreeMap;

use crate::result::BacktestResult;

/// Output of a portfolio backtest across several strategies.
///
/// The weighted sum of the individual daily returns (aligned on
/// `combined.dates`, missing days as zero) reconstructs
/// `combined.daily_returns`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PortfolioBacktestResult {
    /// Result for the blended return series
    pub combined: BacktestResult,
    /// Individual results keyed by strategy id
    pub individual: BTreeMap<String, BacktestResult>,
    /// Normalized weights keyed by strategy id (sum to 1.0)
    pub weights: BTreeMap<String, f64>,
    /// Strategy-by-strategy correlation of daily returns
    pub correlation: CorrelationMatrix,
    /// Per-strategy P&L attribution
    pub attribution: PnlAttribution,
}

/// Square correlation matrix with row/column labels.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorrelationMatrix {
    /// Row and column labels, in order
    pub labels: Vec<String>,
    /// Row-major coefficients
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Looks up the coefficient between two labels.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|label| label == a)?;
        let j = self.labels.iter().position(|label| label == b)?;
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Matrix dimension.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` for an empty matrix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Decomposition of the portfolio's additive return into strategy contributions.
///
/// `total_return` is the arithmetic sum of the combined daily returns, so the
/// contributions add up to it exactly (up to floating-point error).
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PnlAttribution {
    /// Weighted contribution per strategy id
    pub contributions: BTreeMap<String, f64>,
    /// Sum of combined daily returns
    pub total_return: f64,
}

impl PnlAttribution {
    /// Share of the total attributable to `strategy_id` (0.0 when total is 0).
    #[must_use]
    pub fn share(&self, strategy_id: &str) -> f64 {
        match self.contributions.get(strategy_id) {
            Some(contribution) if self.total_return.abs() > f64::EPSILON => {
                contribution / self.total_return
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_lookup() {
        let matrix = CorrelationMatrix {
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![vec![1.0, -0.4], vec![-0.4, 1.0]],
        };
        assert_eq!(matrix.get("a", "b"), Some(-0.4));
        assert_eq!(matrix.get("b", "b"), Some(1.0));
        assert_eq!(matrix.get("a", "c"), None);
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn test_attribution_share() {
        let mut contributions = BTreeMap::new();
        contributions.insert("a".to_string(), 0.03);
        contributions.insert("b".to_string(), 0.01);
        let attribution = PnlAttribution {
            contributions,
            total_return: 0.04,
        };
        assert!((attribution.share("a") - 0.75).abs() < 1e-12);
        assert!(attribution.share("missing").abs() < f64::EPSILON);

        let flat = PnlAttribution::default();
        assert!(flat.share("a").abs() < f64::EPSILON);
    }
}
