//! Sector rollups and cross-sector attractiveness ranking.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::RelvalError;
use crate::reference::MultipleType;
use crate::stats::{mean, median};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple};
use crate::RelvalResult;

use super::weighted::{PortfolioMetric, StockRecord};

const UNCLASSIFIED: &str = "Unclassified";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Simple averages over the stocks of one sector. Each average covers only
/// the stocks that report the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorMetrics {
    pub sector: String,
    pub stock_count: usize,
    pub avg_pe: Option<Multiple>,
    pub median_pe: Option<Multiple>,
    pub avg_pb: Option<Multiple>,
    pub avg_ps: Option<Multiple>,
    pub avg_ev_ebitda: Option<Multiple>,
    pub avg_dividend_yield_pct: Option<Decimal>,
    pub total_market_cap: Money,
}

/// A sector's place in the cross-sector ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRanking {
    pub sector: String,
    pub stock_count: usize,
    pub avg_pe: Option<Multiple>,
    pub avg_pb: Option<Multiple>,
    pub avg_dividend_yield_pct: Option<Decimal>,
    /// 100 x cross-sector mean / sector average, per metric
    pub metric_scores: BTreeMap<MultipleType, Decimal>,
    /// Mean of the available metric scores; higher is cheaper
    pub valuation_score: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorAnalysisInput {
    pub stocks: Vec<StockRecord>,
    /// Multiples the ranking averages over
    #[serde(default = "default_ranking_metrics")]
    pub ranking_metrics: Vec<MultipleType>,
}

fn default_ranking_metrics() -> Vec<MultipleType> {
    vec![MultipleType::PriceEarnings, MultipleType::PriceBook]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorAnalysisOutput {
    pub sectors: Vec<SectorMetrics>,
    /// Most attractive first; sectors without a score last
    pub ranking: Vec<SectorRanking>,
}

impl SectorMetrics {
    /// Sector average of a multiple.
    pub fn average(&self, multiple: MultipleType) -> Option<Multiple> {
        match multiple {
            MultipleType::PriceEarnings => self.avg_pe,
            MultipleType::PriceBook => self.avg_pb,
            MultipleType::PriceSales => self.avg_ps,
            MultipleType::EvEbitda => self.avg_ev_ebitda,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn values_of(stocks: &[StockRecord], metric: PortfolioMetric) -> Vec<Decimal> {
    stocks.iter().filter_map(|s| metric.value_of(s)).collect()
}

/// Aggregate one sector's stocks.
pub fn aggregate_sector(sector: &str, stocks: &[StockRecord]) -> SectorMetrics {
    let pe = values_of(stocks, PortfolioMetric::Pe);

    SectorMetrics {
        sector: sector.to_string(),
        stock_count: stocks.len(),
        avg_pe: mean(&pe),
        median_pe: median(&pe),
        avg_pb: mean(&values_of(stocks, PortfolioMetric::Pb)),
        avg_ps: mean(&values_of(stocks, PortfolioMetric::Ps)),
        avg_ev_ebitda: mean(&values_of(stocks, PortfolioMetric::EvEbitda)),
        avg_dividend_yield_pct: mean(&values_of(stocks, PortfolioMetric::DividendYieldPct)),
        total_market_cap: stocks
            .iter()
            .filter_map(|s| s.market_cap)
            .filter(|mc| *mc > Decimal::ZERO)
            .sum(),
    }
}

/// Group stocks by their `sector` field and aggregate each group, in sector
/// name order.
pub fn aggregate_sectors(stocks: &[StockRecord]) -> Vec<SectorMetrics> {
    let mut groups: BTreeMap<&str, Vec<StockRecord>> = BTreeMap::new();
    for s in stocks {
        let sector = s.sector.as_deref().unwrap_or(UNCLASSIFIED);
        groups.entry(sector).or_default().push(s.clone());
    }
    groups
        .into_iter()
        .map(|(sector, members)| aggregate_sector(sector, &members))
        .collect()
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Score each sector by how cheap its average multiples are relative to the
/// cross-sector mean: `100 / (sector_avg / cross_mean)` per metric, averaged
/// over the metrics the sector has. Sectors with no usable metric are
/// listed last, unscored.
pub fn rank_sectors(sectors: &[SectorMetrics], metrics: &[MultipleType]) -> Vec<SectorRanking> {
    let cross_means: BTreeMap<MultipleType, Decimal> = metrics
        .iter()
        .filter_map(|&m| {
            let avgs: Vec<Decimal> = sectors
                .iter()
                .filter_map(|s| s.average(m))
                .filter(|v| *v > Decimal::ZERO)
                .collect();
            mean(&avgs)
                .filter(|cm| *cm > Decimal::ZERO)
                .map(|cm| (m, cm))
        })
        .collect();

    let mut ranking: Vec<SectorRanking> = sectors
        .iter()
        .map(|s| {
            let metric_scores: BTreeMap<MultipleType, Decimal> = cross_means
                .iter()
                .filter_map(|(&m, &cross)| {
                    let avg = s.average(m).filter(|v| *v > Decimal::ZERO)?;
                    Some((m, dec!(100) * cross / avg))
                })
                .collect();
            let scores: Vec<Decimal> = metric_scores.values().copied().collect();

            SectorRanking {
                sector: s.sector.clone(),
                stock_count: s.stock_count,
                avg_pe: s.avg_pe,
                avg_pb: s.avg_pb,
                avg_dividend_yield_pct: s.avg_dividend_yield_pct,
                valuation_score: mean(&scores),
                metric_scores,
            }
        })
        .collect();

    ranking.sort_by(|a, b| match (a.valuation_score, b.valuation_score) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranking
}

/// Aggregate a stock universe by sector and rank the sectors.
pub fn calculate_sector_analysis(
    input: &SectorAnalysisInput,
) -> RelvalResult<ComputationOutput<SectorAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.stocks.is_empty() {
        return Err(RelvalError::InsufficientData(
            "Sector analysis needs at least one stock".into(),
        ));
    }
    if input.ranking_metrics.is_empty() {
        return Err(RelvalError::InvalidInput {
            field: "ranking_metrics".into(),
            reason: "At least one multiple is needed to rank sectors".into(),
        });
    }

    let sectors = aggregate_sectors(&input.stocks);
    let ranking = rank_sectors(&sectors, &input.ranking_metrics);

    for r in &ranking {
        if r.valuation_score.is_none() {
            warnings.push(format!(
                "Sector '{}' has none of the ranking multiples; left unscored",
                r.sector
            ));
        } else if r.metric_scores.len() < input.ranking_metrics.len() {
            warnings.push(format!(
                "Sector '{}' scored on {} of {} multiples",
                r.sector,
                r.metric_scores.len(),
                input.ranking_metrics.len()
            ));
        }
    }
    if sectors.len() == 1 {
        warnings.push("Only one sector; every score equals 100".into());
    }

    let output = SectorAnalysisOutput { sectors, ranking };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Sector Averages and Inverse-Relative Valuation Ranking",
        &serde_json::json!({
            "ranking_metrics": input.ranking_metrics,
            "score": "100 / (sector average / cross-sector mean), averaged over metrics",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
