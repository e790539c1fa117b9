use relval_core::risk::{calculate_risk_metrics, ReturnFrequency, RiskConfig, RiskMetricsInput, RiskModel};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn five_point() -> Vec<Decimal> {
    vec![dec!(0.04), dec!(-0.05), dec!(0.01), dec!(-0.02), dec!(0.03)]
}

fn sample_returns() -> Vec<Decimal> {
    vec![
        dec!(0.012), dec!(-0.008), dec!(0.004), dec!(-0.021), dec!(0.017),
        dec!(0.003), dec!(-0.011), dec!(0.009), dec!(-0.002), dec!(0.014),
        dec!(-0.016), dec!(0.006), dec!(0.010), dec!(-0.005), dec!(0.002),
        dec!(-0.013), dec!(0.019), dec!(-0.001), dec!(0.007), dec!(-0.009),
    ]
}

// ===========================================================================
// VaR / CVaR
// ===========================================================================

#[test]
fn test_historical_var_five_point_series() {
    let m = RiskModel::new(five_point(), RiskConfig::default()).unwrap();
    assert_eq!(m.var(dec!(0.95)).unwrap(), dec!(-0.044));
    assert_eq!(m.cvar(dec!(0.95)).unwrap(), dec!(-0.05));
}

#[test]
fn test_var_more_severe_at_higher_confidence() {
    let m = RiskModel::new(sample_returns(), RiskConfig::default()).unwrap();
    let v90 = m.var(dec!(0.90)).unwrap();
    let v99 = m.var(dec!(0.99)).unwrap();
    assert!(v99 <= v90);
    assert!(m.cvar(dec!(0.95)).unwrap() <= m.var(dec!(0.95)).unwrap());
}

#[test]
fn test_invalid_confidence_is_error() {
    let input = RiskMetricsInput {
        returns: five_point(),
        market_returns: None,
        confidence_level: dec!(1.5),
        config: RiskConfig::default(),
    };
    assert!(calculate_risk_metrics(&input).is_err());
}

// ===========================================================================
// Drawdown, ratios, beta
// ===========================================================================

#[test]
fn test_drawdown_bounds() {
    let m = RiskModel::new(sample_returns(), RiskConfig::default()).unwrap();
    assert!(m.max_drawdown() <= Decimal::ZERO);
    assert!(m.max_drawdown() > dec!(-1));

    let rising = RiskModel::new(vec![dec!(0.01); 12], RiskConfig::default()).unwrap();
    assert_eq!(rising.max_drawdown(), Decimal::ZERO);
}

#[test]
fn test_metrics_idempotent() {
    let m = RiskModel::new(sample_returns(), RiskConfig::default()).unwrap();
    assert_eq!(m.risk_metrics(dec!(0.95)).unwrap(), m.risk_metrics(dec!(0.95)).unwrap());
}

#[test]
fn test_frequency_changes_annualisation_only() {
    let daily = RiskModel::new(sample_returns(), RiskConfig::default()).unwrap();
    let monthly = RiskModel::new(
        sample_returns(),
        RiskConfig {
            frequency: ReturnFrequency::Monthly,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(daily.volatility() > monthly.volatility());
    assert_eq!(daily.var(dec!(0.95)).unwrap(), monthly.var(dec!(0.95)).unwrap());
    assert_eq!(daily.max_drawdown(), monthly.max_drawdown());
}

#[test]
fn test_beta_against_scaled_market() {
    let market = sample_returns();
    let stock: Vec<Decimal> = market.iter().map(|r| r * dec!(1.5)).collect();
    let m = RiskModel::new(stock, RiskConfig::default())
        .unwrap()
        .with_market(market)
        .unwrap();
    let beta = m.beta().unwrap();
    assert!((beta - dec!(1.5)).abs() < dec!(0.000001), "beta {beta}");
}

#[test]
fn test_envelope_end_to_end() {
    let input = RiskMetricsInput {
        returns: sample_returns(),
        market_returns: Some(sample_returns()),
        confidence_level: dec!(0.95),
        config: RiskConfig::default(),
    };
    let out = calculate_risk_metrics(&input).unwrap();
    let r = &out.result;
    assert_eq!(r.observations, 20);
    assert!(r.volatility > Decimal::ZERO);
    assert!(r.cvar <= r.var);
    assert!((r.beta.unwrap() - Decimal::ONE).abs() < dec!(0.000001));
    assert!(!out.methodology.is_empty());
}
