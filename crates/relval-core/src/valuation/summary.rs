use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::reference::{MultipleType, Statistic};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, ValuationStatus};
use crate::RelvalResult;

use super::financials::ScaledFinancials;
use super::implied::{CompanyValuation, ValuationEngine};

/// Upside beyond which the median implied price flags the stock as mispriced.
const STATUS_BAND_PCT: Decimal = dec!(5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for a comparable-multiples valuation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummaryInput {
    /// Reference sector the target is valued against
    pub sector: String,
    /// Target financials, in any reporting scale
    pub financials: ScaledFinancials,
}

/// One line of the summary: the median-multiple outcome of a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub multiple_type: MultipleType,
    /// Sector median multiple
    pub comparable_multiple: Multiple,
    pub implied_price: Money,
    pub current_price: Option<Money>,
    pub upside_downside_pct: Decimal,
    pub status: ValuationStatus,
}

/// Output of a valuation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummaryOutput {
    pub rows: Vec<SummaryRow>,
    pub valuation: CompanyValuation,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Status from the median upside: beyond +/-5% is mispriced, otherwise fair.
pub fn status_from_upside(upside_downside_pct: Decimal) -> ValuationStatus {
    if upside_downside_pct > STATUS_BAND_PCT {
        ValuationStatus::Undervalued
    } else if upside_downside_pct < -STATUS_BAND_PCT {
        ValuationStatus::Overvalued
    } else {
        ValuationStatus::Fair
    }
}

/// Value the target against its sector under every multiple and summarise
/// each method at the sector median.
pub fn calculate_valuation_summary(
    input: &ValuationSummaryInput,
    engine: &ValuationEngine,
) -> RelvalResult<ComputationOutput<ValuationSummaryOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let financials = input.financials.normalise();
    let valuation = engine.value_company(&financials, &input.sector);

    if !valuation.sector_known {
        warnings.push(format!(
            "Comparable multiples not available for sector '{}'",
            input.sector
        ));
    } else {
        for skipped in &valuation.unavailable {
            warnings.push(skipped.reason.clone());
        }
    }
    if financials.share_price.map_or(true, |p| p <= Decimal::ZERO) {
        warnings.push("Share price missing or not positive; upside/downside reported as 0".into());
    }

    let rows: Vec<SummaryRow> = valuation
        .valuations
        .values()
        .filter_map(|results| results.get(&Statistic::Median))
        .map(|median| SummaryRow {
            multiple_type: median.multiple_type,
            comparable_multiple: median.multiple,
            implied_price: median.implied_price,
            current_price: median.current_price,
            upside_downside_pct: median.upside_downside_pct,
            status: status_from_upside(median.upside_downside_pct),
        })
        .collect();

    let output = ValuationSummaryOutput { rows, valuation };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Comparable Multiples Implied Valuation (P/E, P/B, P/S, EV/EBITDA)",
        &serde_json::json!({
            "sector": input.sector,
            "monetary_scale": input.financials.monetary_scale,
            "share_scale": input.financials.share_scale,
            "summary_statistic": "median",
            "status_band_pct": STATUS_BAND_PCT.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
