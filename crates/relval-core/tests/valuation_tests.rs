use pretty_assertions::assert_eq;
use relval_core::reference::{
    Constituents, MultipleStats, MultipleType, ReferenceMultiples, SectorMultipleProfile,
    Statistic,
};
use relval_core::valuation::{
    calculate_stock_metrics, calculate_valuation_summary, compare_to_benchmark,
    compute_implied_valuation, CompanyFinancials, MarketSnapshot, PeerStance, RelativeSignal,
    ScaledFinancials, ValuationEngine, ValuationSummaryInput,
};
use relval_core::{UnitScale, ValuationStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::Arc;

// ===========================================================================
// Fixtures
// ===========================================================================

fn pe_only_profile(avg: Decimal) -> SectorMultipleProfile {
    let mut multiples = BTreeMap::new();
    multiples.insert(
        MultipleType::PriceEarnings,
        MultipleStats {
            avg,
            median: avg,
            high: avg + dec!(4),
            low: avg - dec!(4),
        },
    );
    SectorMultipleProfile {
        sector: "Test".into(),
        companies: vec!["Peer".into()],
        multiples,
    }
}

fn builtin_engine() -> ValuationEngine {
    ValuationEngine::new(Arc::new(ReferenceMultiples::builtin().unwrap()))
}

// ===========================================================================
// Implied valuation
// ===========================================================================

#[test]
fn test_implied_market_cap_is_multiple_times_driver() {
    let f = CompanyFinancials {
        net_income: Some(dec!(1000)),
        shares_outstanding: Some(dec!(100)),
        share_price: Some(dec!(200)),
        ..Default::default()
    };
    let out = compute_implied_valuation(&f, &pe_only_profile(dec!(24.5)), MultipleType::PriceEarnings);
    let avg = &out[&Statistic::Avg];
    assert_eq!(avg.implied_market_cap, dec!(24500));
    assert_eq!(avg.implied_price, dec!(245));
    assert_eq!(avg.upside_downside_pct, dec!(22.5));
}

#[test]
fn test_implied_results_follow_statistics() {
    let f = CompanyFinancials {
        net_income: Some(dec!(50)),
        shares_outstanding: Some(dec!(10)),
        share_price: Some(dec!(100)),
        ..Default::default()
    };
    let out = compute_implied_valuation(&f, &pe_only_profile(dec!(20)), MultipleType::PriceEarnings);
    assert!(out[&Statistic::Low].implied_price < out[&Statistic::Avg].implied_price);
    assert!(out[&Statistic::Avg].implied_price < out[&Statistic::High].implied_price);
    for r in out.values() {
        assert_eq!(r.implied_market_cap, r.multiple * dec!(50));
    }
}

#[test]
fn test_builtin_it_sector_valuation() {
    let f = CompanyFinancials {
        market_cap: Some(dec!(100_000)),
        net_income: Some(dec!(4_000)),
        book_value: Some(dec!(20_000)),
        revenue: Some(dec!(25_000)),
        ebitda: Some(dec!(6_000)),
        shares_outstanding: Some(dec!(100)),
        share_price: Some(dec!(1_000)),
        net_debt: Some(dec!(1_000)),
    };
    let v = builtin_engine().value_company(&f, "IT & Software");
    assert!(v.sector_known);
    assert_eq!(v.valuations.len(), 4);
    assert!(v.unavailable.is_empty());
    assert!(v.comparable_companies.iter().any(|c| c == "Infosys"));

    let pb_median = &v.valuations[&MultipleType::PriceBook][&Statistic::Median];
    // 4.8 x 20,000 / 100
    assert_eq!(pb_median.implied_price, dec!(960));
    assert_eq!(pb_median.upside_downside_pct, dec!(-4));
}

#[test]
fn test_unknown_sector_is_not_an_error() {
    let v = builtin_engine().value_company(&CompanyFinancials::default(), "Space Tourism");
    assert!(!v.sector_known);
    assert!(v.valuations.is_empty());
    assert!(v.comparable_companies.is_empty());
}

#[test]
fn test_injected_reference_json() {
    let json = r#"{"sectors": [{
        "sector": "Widgets",
        "companies": ["W1", "W2"],
        "multiples": {"P/E": {"avg": "10", "median": "9", "high": "12", "low": "8"}}
    }]}"#;
    let reference = ReferenceMultiples::from_json(json).unwrap();
    let engine = ValuationEngine::new(Arc::new(reference));
    let f = CompanyFinancials {
        net_income: Some(dec!(10)),
        shares_outstanding: Some(dec!(1)),
        ..Default::default()
    };
    let v = engine.value_company(&f, "Widgets");
    assert_eq!(v.valuations[&MultipleType::PriceEarnings][&Statistic::Median].implied_price, dec!(90));
    assert_eq!(v.unavailable.len(), 3);
}

// ===========================================================================
// Summary and unit scales
// ===========================================================================

#[test]
fn test_summary_scales_applied_once() {
    // Same company quoted in lakhs and in crores must value identically
    let base = CompanyFinancials {
        net_income: Some(dec!(500)),
        book_value: Some(dec!(3000)),
        shares_outstanding: Some(dec!(10)),
        share_price: Some(dec!(1000)),
        ..Default::default()
    };
    let in_crores = ValuationSummaryInput {
        sector: "Automobiles".into(),
        financials: ScaledFinancials {
            financials: base.clone(),
            monetary_scale: UnitScale::Crores,
            share_scale: UnitScale::Millions,
        },
    };
    let in_lakhs = ValuationSummaryInput {
        sector: "Automobiles".into(),
        financials: ScaledFinancials {
            financials: CompanyFinancials {
                net_income: Some(dec!(50_000)),
                book_value: Some(dec!(300_000)),
                ..base
            },
            monetary_scale: UnitScale::Lakhs,
            share_scale: UnitScale::Millions,
        },
    };
    let engine = builtin_engine();
    let a = calculate_valuation_summary(&in_crores, &engine).unwrap();
    let b = calculate_valuation_summary(&in_lakhs, &engine).unwrap();
    assert_eq!(a.result.rows, b.result.rows);

    // 15.2 x 500 cr / 10m shares = 7600
    let pe = a
        .result
        .rows
        .iter()
        .find(|r| r.multiple_type == MultipleType::PriceEarnings)
        .unwrap();
    assert_eq!(pe.implied_price, dec!(7600));
    assert_eq!(pe.status, ValuationStatus::Undervalued);
}

// ===========================================================================
// Stock metrics and peer comparison
// ===========================================================================

#[test]
fn test_stock_metrics_from_snapshot() {
    let snapshot = MarketSnapshot {
        current_price: Some(dec!(150)),
        trailing_pe: Some(dec!(12)),
        price_to_book: Some(dec!(1.5)),
        earnings_growth: Some(dec!(0.20)),
        dividend_yield: Some(dec!(0.031)),
        ..Default::default()
    };
    let out = calculate_stock_metrics(&snapshot).unwrap();
    assert_eq!(out.result.peg, Some(dec!(0.6)));
    assert_eq!(out.result.dividend_yield_pct, Some(dec!(3.1)));
    // P/S and EV/EBITDA missing
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_compare_to_sector_average() {
    let reference = ReferenceMultiples::builtin().unwrap();
    let banks = reference.get_sector_multiples("Financial Services");
    let sector_pe = banks.stats(MultipleType::PriceEarnings).unwrap().avg;

    let cheap = compare_to_benchmark(sector_pe * dec!(0.6), sector_pe).unwrap();
    assert_eq!(cheap.signal, RelativeSignal::SignificantlyUndervalued);
    assert_eq!(cheap.stance, PeerStance::StrongBuy);

    let rich = compare_to_benchmark(sector_pe * dec!(1.12), sector_pe).unwrap();
    assert_eq!(rich.signal, RelativeSignal::ModeratelyOvervalued);
    assert_eq!(rich.stance, PeerStance::Sell);
}

#[test]
fn test_constituents_resolve_to_known_sectors() {
    let constituents = Constituents::builtin().unwrap();
    let reference = ReferenceMultiples::builtin().unwrap();
    assert!(!constituents.is_empty());
    for sector in constituents.sectors() {
        assert!(
            !reference.get_sector_multiples(&sector).is_empty(),
            "constituent sector {sector} missing from reference multiples"
        );
    }
}
