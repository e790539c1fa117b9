use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::reference::{MultipleType, ReferenceMultiples, SectorMultipleProfile, Statistic};
use crate::types::{Money, Multiple};

use super::financials::{positive, CompanyFinancials};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Implied valuation of the target at one peer statistic of one multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpliedValuationResult {
    pub multiple_type: MultipleType,
    pub statistic: Statistic,
    /// Peer multiple applied to the target's driver
    pub multiple: Multiple,
    /// Implied enterprise value (EV/EBITDA only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implied_enterprise_value: Option<Money>,
    pub implied_market_cap: Money,
    pub implied_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Money>,
    /// (implied - current) / current, in percent; 0 when either price is not positive
    pub upside_downside_pct: Decimal,
    /// The target's own multiple of the same type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_multiple: Option<Multiple>,
    /// Net debt exceeded the implied EV and the EV was used as market cap
    pub ev_floor_applied: bool,
}

/// Results for one multiple type, keyed by peer statistic.
pub type ImpliedValuations = BTreeMap<Statistic, ImpliedValuationResult>;

/// Why a multiple type produced no implied valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailableMultiple {
    pub multiple_type: MultipleType,
    pub reason: String,
}

/// Implied valuations of one company across every multiple type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyValuation {
    pub sector: String,
    /// False when the sector is missing from the reference table
    pub sector_known: bool,
    pub comparable_companies: Vec<String>,
    pub valuations: BTreeMap<MultipleType, ImpliedValuations>,
    pub unavailable: Vec<UnavailableMultiple>,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Implied market cap, price and upside of the target for each peer statistic
/// of `multiple_type`.
///
/// Returns an empty map when the driver for the multiple is missing or not
/// positive, when shares outstanding is missing or not positive, or when the
/// sector profile carries no statistics for the multiple.
pub fn compute_implied_valuation(
    financials: &CompanyFinancials,
    sector_stats: &SectorMultipleProfile,
    multiple_type: MultipleType,
) -> ImpliedValuations {
    let mut results = ImpliedValuations::new();

    let (Some(driver), Some(shares), Some(stats)) = (
        driver_value(financials, multiple_type),
        positive(financials.shares_outstanding),
        sector_stats.stats(multiple_type),
    ) else {
        return results;
    };

    let net_debt = financials.net_debt.unwrap_or(Decimal::ZERO);
    let current_multiple = current_multiple(financials, multiple_type, driver);

    for statistic in Statistic::ALL {
        let multiple = stats.get(statistic);
        if multiple <= Decimal::ZERO {
            continue;
        }

        // A statistic whose implied figures leave the Decimal range is skipped
        let Some(implied_value) = multiple.checked_mul(driver) else {
            continue;
        };
        let (implied_enterprise_value, implied_market_cap, ev_floor_applied) = match multiple_type
        {
            MultipleType::EvEbitda => {
                let Some(equity) = implied_value.checked_sub(net_debt) else {
                    continue;
                };
                if equity <= Decimal::ZERO {
                    (Some(implied_value), implied_value, true)
                } else {
                    (Some(implied_value), equity, false)
                }
            }
            _ => (None, implied_value, false),
        };

        let current_price = financials.share_price;
        let Some(implied_price) = implied_market_cap.checked_div(shares) else {
            continue;
        };
        let Some(upside) = upside_downside_pct(implied_price, current_price) else {
            continue;
        };

        results.insert(
            statistic,
            ImpliedValuationResult {
                multiple_type,
                statistic,
                multiple,
                implied_enterprise_value,
                implied_market_cap,
                implied_price,
                current_price,
                upside_downside_pct: upside,
                current_multiple,
                ev_floor_applied,
            },
        );
    }

    results
}

/// Reason `compute_implied_valuation` would return nothing, if any.
pub fn unavailable_reason(
    financials: &CompanyFinancials,
    sector_stats: &SectorMultipleProfile,
    multiple_type: MultipleType,
) -> Option<String> {
    if sector_stats.stats(multiple_type).is_none() {
        return Some(format!(
            "No {multiple_type} reference multiples for sector '{}'",
            sector_stats.sector
        ));
    }
    if driver_value(financials, multiple_type).is_none() {
        return Some(format!(
            "{multiple_type} not available: {} is missing or not positive",
            multiple_type.driver_name()
        ));
    }
    if positive(financials.shares_outstanding).is_none() {
        return Some(format!(
            "{multiple_type} not available: shares outstanding is missing or not positive"
        ));
    }
    None
}

/// Percentage move from the current price to the implied price.
///
/// 0 when either price is not positive; `None` only when the move is too
/// large to represent.
pub fn upside_downside_pct(implied_price: Money, current_price: Option<Money>) -> Option<Decimal> {
    match current_price {
        Some(current) if current > Decimal::ZERO && implied_price > Decimal::ZERO => {
            (implied_price - current)
                .checked_div(current)?
                .checked_mul(dec!(100))
        }
        _ => Some(Decimal::ZERO),
    }
}

fn driver_value(financials: &CompanyFinancials, multiple_type: MultipleType) -> Option<Money> {
    let value = match multiple_type {
        MultipleType::PriceEarnings => financials.net_income,
        MultipleType::PriceBook => financials.book_value,
        MultipleType::PriceSales => financials.revenue,
        MultipleType::EvEbitda => financials.ebitda,
    };
    positive(value)
}

fn current_multiple(
    financials: &CompanyFinancials,
    multiple_type: MultipleType,
    driver: Money,
) -> Option<Multiple> {
    let market_cap = positive(financials.market_cap)?;
    let numerator = match multiple_type {
        MultipleType::EvEbitda => {
            market_cap.checked_add(financials.net_debt.unwrap_or(Decimal::ZERO))?
        }
        _ => market_cap,
    };
    numerator.checked_div(driver)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Implied-valuation engine bound to an injected reference dataset.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    reference: Arc<ReferenceMultiples>,
}

impl ValuationEngine {
    pub fn new(reference: Arc<ReferenceMultiples>) -> Self {
        ValuationEngine { reference }
    }

    pub fn reference(&self) -> &ReferenceMultiples {
        &self.reference
    }

    /// Sector lookup; unknown sectors yield an empty profile.
    pub fn profile(&self, sector: &str) -> SectorMultipleProfile {
        self.reference.get_sector_multiples(sector)
    }

    /// Run every multiple type for the target against its sector.
    pub fn value_company(&self, financials: &CompanyFinancials, sector: &str) -> CompanyValuation {
        let profile = self.profile(sector);
        let mut valuations = BTreeMap::new();
        let mut unavailable = Vec::new();

        for multiple_type in MultipleType::ALL {
            let results = compute_implied_valuation(financials, &profile, multiple_type);
            if results.is_empty() {
                let reason = unavailable_reason(financials, &profile, multiple_type)
                    .unwrap_or_else(|| {
                        format!(
                            "{multiple_type} not available: reference multiples are non-positive \
                             or the implied values are out of range"
                        )
                    });
                unavailable.push(UnavailableMultiple {
                    multiple_type,
                    reason,
                });
            } else {
                valuations.insert(multiple_type, results);
            }
        }

        CompanyValuation {
            sector: sector.to_string(),
            sector_known: !profile.is_empty(),
            comparable_companies: profile.companies.clone(),
            valuations,
            unavailable,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
