use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::RelvalResult;

use super::financials::{positive, MarketSnapshot};

/// A company's own valuation multiples, derived from one market snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub pe: Option<Multiple>,
    pub pb: Option<Multiple>,
    pub ps: Option<Multiple>,
    pub ev_ebitda: Option<Multiple>,
    /// P/E divided by earnings growth in percent
    pub peg: Option<Multiple>,
    pub dividend_yield_pct: Option<Decimal>,
    pub current_price: Option<Money>,
    pub market_cap: Option<Money>,
    pub net_debt: Option<Money>,
    pub enterprise_value: Option<Money>,
    /// Where the price sits in the 52-week range (0 = low, 1 = high)
    pub fifty_two_week_position: Option<Rate>,
    /// Distance below the 52-week high, in percent
    pub pct_below_52_week_high: Option<Decimal>,
}

/// Derive the company's multiples from a snapshot, skipping anything absent
/// or non-positive.
pub fn stock_metrics(snapshot: &MarketSnapshot) -> StockMetrics {
    let pe = positive(snapshot.trailing_pe);
    let price = positive(snapshot.current_price);

    StockMetrics {
        pe,
        pb: positive(snapshot.price_to_book),
        ps: positive(snapshot.price_to_sales),
        ev_ebitda: positive(snapshot.ev_to_ebitda),
        peg: peg_ratio(pe, snapshot.earnings_growth),
        dividend_yield_pct: dividend_yield_pct(snapshot.dividend_yield),
        current_price: price,
        market_cap: positive(snapshot.market_cap),
        net_debt: snapshot.net_debt(),
        enterprise_value: snapshot.enterprise_value(),
        fifty_two_week_position: range_position(
            price,
            snapshot.fifty_two_week_low,
            snapshot.fifty_two_week_high,
        ),
        pct_below_52_week_high: match (price, positive(snapshot.fifty_two_week_high)) {
            (Some(p), Some(high)) => (high - p)
                .checked_div(high)
                .and_then(|r| r.checked_mul(dec!(100))),
            _ => None,
        },
    }
}

/// PEG = P/E / (growth x 100); undefined for non-positive growth.
pub fn peg_ratio(pe: Option<Multiple>, earnings_growth: Option<Rate>) -> Option<Multiple> {
    let pe = positive(pe)?;
    let growth_pct = positive(earnings_growth)?.checked_mul(dec!(100))?;
    pe.checked_div(growth_pct)
}

/// Dividend yield fraction to percent. A zero yield is a valid observation.
pub fn dividend_yield_pct(dividend_yield: Option<Rate>) -> Option<Decimal> {
    dividend_yield
        .filter(|y| *y >= Decimal::ZERO)
        .and_then(|y| y.checked_mul(dec!(100)))
}

fn range_position(
    price: Option<Money>,
    low: Option<Money>,
    high: Option<Money>,
) -> Option<Rate> {
    let (price, low, high) = (price?, positive(low)?, positive(high)?);
    if high <= low {
        return None;
    }
    if price <= low {
        return Some(Decimal::ZERO);
    }
    if price >= high {
        return Some(Decimal::ONE);
    }
    Some((price - low) / (high - low))
}

/// Stock metrics with a warning for each multiple that could not be derived.
pub fn calculate_stock_metrics(
    snapshot: &MarketSnapshot,
) -> RelvalResult<ComputationOutput<StockMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let metrics = stock_metrics(snapshot);

    for (name, value) in [
        ("P/E", metrics.pe),
        ("P/B", metrics.pb),
        ("P/S", metrics.ps),
        ("EV/EBITDA", metrics.ev_ebitda),
        ("PEG", metrics.peg),
    ] {
        if value.is_none() {
            warnings.push(format!("{name} unavailable: missing or non-positive input"));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Relative Valuation Multiples (P/E, P/B, P/S, EV/EBITDA, PEG, Dividend Yield)",
        snapshot,
        warnings,
        elapsed,
        metrics,
    ))
}
