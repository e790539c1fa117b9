use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RelvalError;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::RelvalResult;

const BASE_SCORE: Decimal = dec!(50);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Balance-sheet and income items for the leverage and liquidity check.
/// Any field may be omitted; ratios that need it are then unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialHealthInput {
    #[serde(default)]
    pub total_debt: Option<Money>,
    #[serde(default)]
    pub equity: Option<Money>,
    #[serde(default)]
    pub ebit: Option<Money>,
    #[serde(default)]
    pub interest_expense: Option<Money>,
    #[serde(default)]
    pub current_assets: Option<Money>,
    #[serde(default)]
    pub current_liabilities: Option<Money>,
    /// Current assets less inventory
    #[serde(default)]
    pub quick_assets: Option<Money>,
    #[serde(default)]
    pub operating_cash_flow: Option<Money>,
    #[serde(default)]
    pub net_income: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeverageLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStrength {
    Strong,
    Adequate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiquidityLevel {
    Healthy,
    Adequate,
    AtRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub debt_to_equity: Option<Multiple>,
    /// EBIT / interest expense
    pub interest_coverage: Option<Multiple>,
    pub current_ratio: Option<Multiple>,
    pub quick_ratio: Option<Multiple>,
    /// Operating cash flow / net income
    pub cash_conversion: Option<Rate>,
    /// 0-100, starting from 50
    pub health_score: Decimal,
    pub leverage: Option<LeverageLevel>,
    pub coverage: Option<CoverageStrength>,
    pub liquidity: Option<LiquidityLevel>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Leverage, coverage and liquidity ratios with the 0-100 health score.
///
/// Score: D/E < 1 +15, > 2 -15; coverage > 5 +15, < 2 -15; current ratio
/// strictly between 1.5 and 3 +10, below 1 -10. Clamped to [0, 100].
pub fn assess_financial_health(input: &FinancialHealthInput) -> FinancialHealth {
    let debt_to_equity = ratio(input.total_debt, input.equity);
    let interest_coverage = ratio(input.ebit, input.interest_expense);
    let current_ratio = ratio(input.current_assets, input.current_liabilities);
    let quick_ratio = ratio(input.quick_assets, input.current_liabilities);
    let cash_conversion = ratio(input.operating_cash_flow, input.net_income);

    let mut score = BASE_SCORE;

    if let Some(de) = debt_to_equity {
        if de < Decimal::ONE {
            score += dec!(15);
        } else if de > dec!(2) {
            score -= dec!(15);
        }
    }
    if let Some(ic) = interest_coverage {
        if ic > dec!(5) {
            score += dec!(15);
        } else if ic < dec!(2) {
            score -= dec!(15);
        }
    }
    if let Some(cr) = current_ratio {
        if cr > dec!(1.5) && cr < dec!(3) {
            score += dec!(10);
        } else if cr < Decimal::ONE {
            score -= dec!(10);
        }
    }

    FinancialHealth {
        debt_to_equity,
        interest_coverage,
        current_ratio,
        quick_ratio,
        cash_conversion,
        health_score: score.clamp(Decimal::ZERO, dec!(100)),
        leverage: debt_to_equity.map(|de| {
            if de < Decimal::ONE {
                LeverageLevel::Low
            } else if de < dec!(2) {
                LeverageLevel::Moderate
            } else {
                LeverageLevel::High
            }
        }),
        coverage: interest_coverage.map(|ic| {
            if ic > dec!(5) {
                CoverageStrength::Strong
            } else if ic > dec!(2.5) {
                CoverageStrength::Adequate
            } else {
                CoverageStrength::Weak
            }
        }),
        liquidity: current_ratio.map(|cr| {
            if cr > dec!(1.5) && cr < dec!(3) {
                LiquidityLevel::Healthy
            } else if cr < Decimal::ONE {
                LiquidityLevel::AtRisk
            } else {
                LiquidityLevel::Adequate
            }
        }),
    }
}

/// Financial health with warnings for every ratio that could not be formed.
pub fn calculate_financial_health(
    input: &FinancialHealthInput,
) -> RelvalResult<ComputationOutput<FinancialHealth>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;
    let health = assess_financial_health(input);

    for (name, value, denominator) in [
        ("D/E", health.debt_to_equity, "equity"),
        ("Interest coverage", health.interest_coverage, "interest expense"),
        ("Current ratio", health.current_ratio, "current liabilities"),
        ("Quick ratio", health.quick_ratio, "current liabilities"),
        ("Cash conversion", health.cash_conversion, "net income"),
    ] {
        if value.is_none() {
            warnings.push(format!(
                "{name} unavailable: missing input or {denominator} not positive"
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Leverage, Coverage and Liquidity Ratios with Additive Health Score",
        &serde_json::json!({
            "base_score": BASE_SCORE.to_string(),
            "debt_to_equity": "<1 +15, >2 -15",
            "interest_coverage": ">5 +15, <2 -15",
            "current_ratio": "1.5..3 +10, <1 -10",
        }),
        warnings,
        elapsed,
        health,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &FinancialHealthInput) -> RelvalResult<()> {
    for (field, value) in [
        ("total_debt", input.total_debt),
        ("interest_expense", input.interest_expense),
        ("current_assets", input.current_assets),
        ("current_liabilities", input.current_liabilities),
        ("quick_assets", input.quick_assets),
    ] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(RelvalError::InvalidInput {
                field: field.into(),
                reason: "Cannot be negative".into(),
            });
        }
    }
    Ok(())
}

fn ratio(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    let denominator = denominator.filter(|d| *d > Decimal::ZERO)?;
    Some(numerator? / denominator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> FinancialHealthInput {
        FinancialHealthInput {
            total_debt: Some(dec!(50_000)),
            equity: Some(dec!(200_000)),
            ebit: Some(dec!(45_000)),
            interest_expense: Some(dec!(2_000)),
            current_assets: Some(dec!(80_000)),
            current_liabilities: Some(dec!(45_000)),
            quick_assets: Some(dec!(60_000)),
            operating_cash_flow: Some(dec!(35_000)),
            net_income: Some(dec!(20_000)),
        }
    }

    #[test]
    fn test_healthy_company() {
        let h = assess_financial_health(&sample_input());
        assert_eq!(h.debt_to_equity, Some(dec!(0.25)));
        assert_eq!(h.interest_coverage, Some(dec!(22.5)));
        assert_eq!(h.cash_conversion, Some(dec!(1.75)));
        // current ratio 1.78 is healthy: 50 + 15 + 15 + 10
        assert_eq!(h.health_score, dec!(90));
        assert_eq!(h.leverage, Some(LeverageLevel::Low));
        assert_eq!(h.coverage, Some(CoverageStrength::Strong));
        assert_eq!(h.liquidity, Some(LiquidityLevel::Healthy));
    }

    #[test]
    fn test_distressed_company() {
        let input = FinancialHealthInput {
            total_debt: Some(dec!(900)),
            equity: Some(dec!(300)),
            ebit: Some(dec!(30)),
            interest_expense: Some(dec!(20)),
            current_assets: Some(dec!(80)),
            current_liabilities: Some(dec!(100)),
            ..Default::default()
        };
        let h = assess_financial_health(&input);
        // 50 - 15 - 15 - 10
        assert_eq!(h.health_score, dec!(10));
        assert_eq!(h.leverage, Some(LeverageLevel::High));
        assert_eq!(h.coverage, Some(CoverageStrength::Weak));
        assert_eq!(h.liquidity, Some(LiquidityLevel::AtRisk));
    }

    #[test]
    fn test_zero_denominators_unavailable() {
        let input = FinancialHealthInput {
            total_debt: Some(dec!(100)),
            equity: Some(Decimal::ZERO),
            ebit: Some(dec!(10)),
            interest_expense: Some(Decimal::ZERO),
            ..Default::default()
        };
        let h = assess_financial_health(&input);
        assert_eq!(h.debt_to_equity, None);
        assert_eq!(h.interest_coverage, None);
        assert_eq!(h.current_ratio, None);
        assert_eq!(h.health_score, dec!(50));
    }

    #[test]
    fn test_missing_debt_leaves_leverage_unscored() {
        let input = FinancialHealthInput {
            equity: Some(dec!(100)),
            ..Default::default()
        };
        let h = assess_financial_health(&input);
        assert_eq!(h.debt_to_equity, None);
        assert_eq!(h.leverage, None);
        assert_eq!(h.health_score, dec!(50));
    }

    #[test]
    fn test_envelope_warns_and_validates() {
        let out = calculate_financial_health(&FinancialHealthInput::default()).unwrap();
        // nothing supplied, so every ratio warns
        assert_eq!(out.warnings.len(), 5);

        let bad = FinancialHealthInput {
            current_liabilities: Some(dec!(-1)),
            ..Default::default()
        };
        assert!(calculate_financial_health(&bad).is_err());
    }
}
