use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Multiple, Rate, UnitScale};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Target-company financials in base units (currency units, raw share count).
///
/// Every field is optional; a computation that needs an absent or
/// non-positive driver is skipped rather than substituted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFinancials {
    /// Market capitalisation (equity value)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Money>,
    /// Trailing net income
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_income: Option<Money>,
    /// Book value of equity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_value: Option<Money>,
    /// Total revenue / sales
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<Money>,
    /// EBITDA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<Money>,
    /// Shares outstanding (raw count)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_outstanding: Option<Decimal>,
    /// Current share price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_price: Option<Money>,
    /// Total debt less cash and equivalents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_debt: Option<Money>,
}

/// Financials as supplied by a caller working in a reporting scale
/// (e.g. crores of rupees and millions of shares).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaledFinancials {
    #[serde(flatten)]
    pub financials: CompanyFinancials,
    /// Scale of market_cap, net_income, book_value, revenue, ebitda, net_debt
    #[serde(default)]
    pub monetary_scale: UnitScale,
    /// Scale of shares_outstanding
    #[serde(default)]
    pub share_scale: UnitScale,
}

/// Per-company quote and fundamentals as returned by a market-data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_pe: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_to_book: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_to_sales: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_to_ebitda: Option<Multiple>,
    /// Dividend yield as a fraction (0.012 = 1.2%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_outstanding: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_debt: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cash: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_high: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_low: Option<Money>,
    /// Earnings growth as a fraction (0.15 = 15%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings_growth: Option<Rate>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl ScaledFinancials {
    /// Convert to base units. Share price is already per share and is left as is.
    /// A figure too large to express in base units is dropped.
    pub fn normalise(&self) -> CompanyFinancials {
        let money = |v: Option<Decimal>| v.and_then(|x| self.monetary_scale.to_base(x));
        let f = &self.financials;
        CompanyFinancials {
            market_cap: money(f.market_cap),
            net_income: money(f.net_income),
            book_value: money(f.book_value),
            revenue: money(f.revenue),
            ebitda: money(f.ebitda),
            shares_outstanding: f.shares_outstanding.and_then(|s| self.share_scale.to_base(s)),
            share_price: f.share_price,
            net_debt: money(f.net_debt),
        }
    }
}

impl MarketSnapshot {
    /// Total debt minus cash; a missing side counts as zero only when the
    /// other side is reported.
    pub fn net_debt(&self) -> Option<Money> {
        match (self.total_debt, self.total_cash) {
            (Some(debt), Some(cash)) => debt.checked_sub(cash),
            (Some(debt), None) => Some(debt),
            (None, Some(cash)) => Some(-cash),
            (None, None) => None,
        }
    }

    /// Market cap plus net debt.
    pub fn enterprise_value(&self) -> Option<Money> {
        self.market_cap
            .and_then(|mc| mc.checked_add(self.net_debt().unwrap_or(Decimal::ZERO)))
    }
}

impl CompanyFinancials {
    /// Back out valuation drivers from a quote's market cap and its own ratios.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        let market_cap = positive(snapshot.market_cap);
        let implied = |ratio: Option<Multiple>| match (market_cap, positive(ratio)) {
            (Some(mc), Some(r)) => mc.checked_div(r),
            _ => None,
        };

        let ebitda = match (snapshot.enterprise_value(), positive(snapshot.ev_to_ebitda)) {
            (Some(ev), Some(r)) if ev > Decimal::ZERO && market_cap.is_some() => ev.checked_div(r),
            _ => None,
        };

        CompanyFinancials {
            market_cap,
            net_income: implied(snapshot.trailing_pe),
            book_value: implied(snapshot.price_to_book),
            revenue: implied(snapshot.price_to_sales),
            ebitda,
            shares_outstanding: positive(snapshot.shares_outstanding),
            share_price: positive(snapshot.current_price),
            net_debt: snapshot.net_debt(),
        }
    }
}

/// Keep a value only when it is present and strictly positive.
pub(crate) fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
