use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::RelvalError;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::RelvalResult;

/// Weights within this distance of 1 are used as given.
const WEIGHT_TOLERANCE: Decimal = dec!(0.001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One stock's multiples. Field names match `StockMetrics` so a metrics
/// record can be reused with a name attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pb: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ps: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_ebitda: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Money>,
}

/// A stock held at a portfolio weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    #[serde(flatten)]
    pub stock: StockRecord,
    pub weight: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioMetric {
    Pe,
    Pb,
    Ps,
    EvEbitda,
    DividendYieldPct,
}

impl PortfolioMetric {
    pub const ALL: [PortfolioMetric; 5] = [
        PortfolioMetric::Pe,
        PortfolioMetric::Pb,
        PortfolioMetric::Ps,
        PortfolioMetric::EvEbitda,
        PortfolioMetric::DividendYieldPct,
    ];

    /// The usable value of this metric for a stock. Multiples must be
    /// positive; a zero dividend yield is a real observation.
    pub fn value_of(self, stock: &StockRecord) -> Option<Decimal> {
        match self {
            PortfolioMetric::Pe => stock.pe.filter(|v| *v > Decimal::ZERO),
            PortfolioMetric::Pb => stock.pb.filter(|v| *v > Decimal::ZERO),
            PortfolioMetric::Ps => stock.ps.filter(|v| *v > Decimal::ZERO),
            PortfolioMetric::EvEbitda => stock.ev_ebitda.filter(|v| *v > Decimal::ZERO),
            PortfolioMetric::DividendYieldPct => {
                stock.dividend_yield_pct.filter(|v| *v >= Decimal::ZERO)
            }
        }
    }
}

impl std::fmt::Display for PortfolioMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioMetric::Pe => write!(f, "P/E"),
            PortfolioMetric::Pb => write!(f, "P/B"),
            PortfolioMetric::Ps => write!(f, "P/S"),
            PortfolioMetric::EvEbitda => write!(f, "EV/EBITDA"),
            PortfolioMetric::DividendYieldPct => write!(f, "Dividend Yield %"),
        }
    }
}

/// Weighted average of one metric and the share of portfolio weight behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedMetric {
    pub metric: PortfolioMetric,
    pub value: Option<Decimal>,
    /// Fraction of (normalised) portfolio weight that reported the metric
    pub coverage: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioMetricsOutput {
    pub holdings_count: usize,
    /// Sum of the weights as supplied
    pub input_weight_sum: Decimal,
    pub weights_normalised: bool,
    pub metrics: Vec<WeightedMetric>,
    /// Normalised weight per sector; holdings without a sector are "Unclassified"
    pub sector_weights: BTreeMap<String, Rate>,
}

/// Holdings with weights that sum to 1.
#[derive(Debug, Clone)]
pub struct PortfolioAggregator {
    holdings: Vec<Holding>,
    input_weight_sum: Decimal,
    normalised: bool,
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

impl PortfolioAggregator {
    /// Validate the holdings and rescale weights when they are more than
    /// 0.001 away from summing to 1.
    pub fn new(mut holdings: Vec<Holding>) -> RelvalResult<Self> {
        if holdings.is_empty() {
            return Err(RelvalError::InsufficientData(
                "Portfolio has no holdings".into(),
            ));
        }
        if let Some(h) = holdings.iter().find(|h| h.weight < Decimal::ZERO) {
            return Err(RelvalError::InvalidInput {
                field: "weight".into(),
                reason: format!("Holding '{}' has a negative weight", h.stock.name),
            });
        }

        let sum = holdings
            .iter()
            .try_fold(Decimal::ZERO, |acc, h| acc.checked_add(h.weight))
            .ok_or_else(|| RelvalError::InvalidInput {
                field: "weight".into(),
                reason: "Portfolio weights sum beyond the representable range".into(),
            })?;
        if sum <= Decimal::ZERO {
            return Err(RelvalError::InvalidInput {
                field: "weight".into(),
                reason: "Portfolio weights must sum to a positive number".into(),
            });
        }

        let normalised = (sum - Decimal::ONE).abs() > WEIGHT_TOLERANCE;
        if normalised {
            for h in &mut holdings {
                h.weight /= sum;
            }
        }

        Ok(PortfolioAggregator {
            holdings,
            input_weight_sum: sum,
            normalised,
        })
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn weights_normalised(&self) -> bool {
        self.normalised
    }

    /// sum(v_i x w_i) / sum(w_i) over the holdings that report the metric.
    /// `None` when no holding (with non-zero weight) reports it, or when the
    /// weighted sum leaves the `Decimal` range.
    pub fn weighted_average(&self, metric: PortfolioMetric) -> Option<Decimal> {
        let (weighted, weight) = self.weighted_sums(metric);
        if weight.is_zero() {
            return None;
        }
        weighted?.checked_div(weight)
    }

    /// Portfolio weight carried by holdings that report the metric.
    pub fn coverage(&self, metric: PortfolioMetric) -> Rate {
        self.weighted_sums(metric).1
    }

    fn weighted_sums(&self, metric: PortfolioMetric) -> (Option<Decimal>, Decimal) {
        self.holdings
            .iter()
            .filter_map(|h| metric.value_of(&h.stock).map(|v| (v, h.weight)))
            .fold((Some(Decimal::ZERO), Decimal::ZERO), |(vw, w), (v, wi)| {
                let vw = vw.and_then(|acc| acc.checked_add(v.checked_mul(wi)?));
                (vw, w + wi)
            })
    }

    pub fn sector_weights(&self) -> BTreeMap<String, Rate> {
        let mut weights = BTreeMap::new();
        for h in &self.holdings {
            let sector = h.stock.sector.as_deref().unwrap_or("Unclassified");
            *weights.entry(sector.to_string()).or_insert(Decimal::ZERO) += h.weight;
        }
        weights
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Weighted-average multiples and dividend yield of a portfolio.
pub fn calculate_portfolio_metrics(
    input: &PortfolioInput,
) -> RelvalResult<ComputationOutput<PortfolioMetricsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let portfolio = PortfolioAggregator::new(input.holdings.clone())?;

    if portfolio.weights_normalised() {
        warnings.push(format!(
            "Weights summed to {}; rescaled to 1",
            portfolio.input_weight_sum
        ));
    }

    let metrics: Vec<WeightedMetric> = PortfolioMetric::ALL
        .iter()
        .map(|&metric| {
            let value = portfolio.weighted_average(metric);
            let coverage = portfolio.coverage(metric);
            if value.is_none() {
                warnings.push(format!("No holding reports {metric}"));
            } else if coverage < Decimal::ONE - WEIGHT_TOLERANCE {
                warnings.push(format!(
                    "{metric} averaged over {}% of portfolio weight",
                    (coverage * dec!(100)).round_dp(1)
                ));
            }
            WeightedMetric {
                metric,
                value,
                coverage,
            }
        })
        .collect();

    let output = PortfolioMetricsOutput {
        holdings_count: portfolio.holdings().len(),
        input_weight_sum: portfolio.input_weight_sum,
        weights_normalised: portfolio.weights_normalised(),
        metrics,
        sector_weights: portfolio.sector_weights(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted-Average Portfolio Multiples",
        &serde_json::json!({
            "weight_tolerance": WEIGHT_TOLERANCE.to_string(),
            "missing_metric": "excluded; remaining weights rescaled",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
