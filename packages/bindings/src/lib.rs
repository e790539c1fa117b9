use std::sync::Arc;

use napi::Result as NapiResult;
use napi_derive::napi;

use relval_core::reference::{Constituents, ReferenceMultiples};
use relval_core::valuation::{ScaledFinancials, ValuationEngine};
use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// The caller's sector table when given, otherwise the bundled one.
fn engine(reference_json: Option<String>) -> NapiResult<ValuationEngine> {
    let reference = match reference_json {
        Some(json) => ReferenceMultiples::from_json(&json),
        None => ReferenceMultiples::builtin(),
    }
    .map_err(to_napi_error)?;
    Ok(ValuationEngine::new(Arc::new(reference)))
}

// ---------------------------------------------------------------------------
// Valuation
// ---------------------------------------------------------------------------

#[napi]
pub fn valuation_summary(input_json: String, reference_json: Option<String>) -> NapiResult<String> {
    let input: relval_core::valuation::ValuationSummaryInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        relval_core::valuation::calculate_valuation_summary(&input, &engine(reference_json)?)
            .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Implied prices at every peer statistic. `financials_json` is a
/// `ScaledFinancials` object; scales default to units.
#[napi]
pub fn implied_valuation(
    financials_json: String,
    sector: String,
    reference_json: Option<String>,
) -> NapiResult<String> {
    let financials: ScaledFinancials =
        serde_json::from_str(&financials_json).map_err(to_napi_error)?;
    let valuation = engine(reference_json)?.value_company(&financials.normalise(), &sector);
    serde_json::to_string(&valuation).map_err(to_napi_error)
}

#[napi]
pub fn stock_metrics(input_json: String) -> NapiResult<String> {
    let input: relval_core::valuation::MarketSnapshot =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        relval_core::valuation::calculate_stock_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_to_benchmark(multiple: String, benchmark: String) -> NapiResult<String> {
    let multiple = multiple.parse::<Decimal>().map_err(to_napi_error)?;
    let benchmark = benchmark.parse::<Decimal>().map_err(to_napi_error)?;
    let comparison = relval_core::valuation::compare_to_benchmark(multiple, benchmark)
        .ok_or_else(|| to_napi_error("Multiple and benchmark must both be positive"))?;
    serde_json::to_string(&comparison).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

#[napi]
pub fn valuation_signal(input_json: String) -> NapiResult<String> {
    let input: relval_core::signal::SignalInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        relval_core::signal::calculate_valuation_signal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[napi]
pub fn risk_metrics(input_json: String) -> NapiResult<String> {
    let input: relval_core::risk::RiskMetricsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = relval_core::risk::calculate_risk_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio & sectors
// ---------------------------------------------------------------------------

#[napi]
pub fn portfolio_metrics(input_json: String) -> NapiResult<String> {
    let input: relval_core::portfolio::PortfolioInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        relval_core::portfolio::calculate_portfolio_metrics(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn sector_analysis(input_json: String) -> NapiResult<String> {
    let input: relval_core::portfolio::SectorAnalysisInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        relval_core::portfolio::calculate_sector_analysis(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Financial health
// ---------------------------------------------------------------------------

#[napi]
pub fn financial_health(input_json: String) -> NapiResult<String> {
    let input: relval_core::health::FinancialHealthInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        relval_core::health::calculate_financial_health(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[napi]
pub fn sector_multiples(sector: String) -> NapiResult<String> {
    let reference = ReferenceMultiples::builtin().map_err(to_napi_error)?;
    serde_json::to_string(&reference.get_sector_multiples(&sector)).map_err(to_napi_error)
}

#[napi]
pub fn list_sectors() -> NapiResult<Vec<String>> {
    let reference = ReferenceMultiples::builtin().map_err(to_napi_error)?;
    Ok(reference.sectors().map(String::from).collect())
}

#[napi]
pub fn constituent(ticker: String) -> NapiResult<Option<String>> {
    let constituents = Constituents::builtin().map_err(to_napi_error)?;
    constituents
        .get(&ticker)
        .map(|c| serde_json::to_string(c).map_err(to_napi_error))
        .transpose()
}
