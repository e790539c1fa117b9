use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::RelvalError;
use crate::stats::{
    mean, population_variance, quantile, sample_covariance, sample_variance, sqrt_decimal,
};
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::RelvalResult;

use super::config::RiskConfig;

/// Below this many observations the historical tail estimates are flagged.
const MIN_TAIL_OBSERVATIONS: usize = 20;

/// Largest accepted periodic return magnitude (100,000,000%). Keeps every
/// sum of squares well inside the `Decimal` range.
pub const MAX_ABS_RETURN: Decimal = dec!(1_000_000);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for the risk metrics entry point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetricsInput {
    /// Periodic returns (as decimals, e.g. 0.01 = 1%)
    pub returns: Vec<Decimal>,
    /// Market returns over the same periods, for beta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_returns: Option<Vec<Decimal>>,
    /// Confidence level for VaR / CVaR (e.g. 0.95)
    #[serde(default = "default_confidence")]
    pub confidence_level: Rate,
    #[serde(default)]
    pub config: RiskConfig,
}

fn default_confidence() -> Rate {
    dec!(0.95)
}

/// Every statistic of a return series at one confidence level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    pub observations: usize,
    pub periods_per_year: Decimal,
    /// Mean periodic return x periods per year
    pub annualised_return: Rate,
    /// Annualised sample standard deviation
    pub volatility: Rate,
    pub sharpe_ratio: Decimal,
    pub sortino_ratio: Decimal,
    /// Worst peak-to-trough decline of the compounded curve (<= 0)
    pub max_drawdown: Rate,
    pub confidence_level: Rate,
    /// Historical VaR as a periodic return (negative = loss)
    pub var: Rate,
    /// Mean of the returns at or below VaR
    pub cvar: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<Decimal>,
}

/// A periodic return series with its annualisation settings.
#[derive(Debug, Clone)]
pub struct RiskModel {
    returns: Vec<Decimal>,
    market_returns: Option<Vec<Decimal>>,
    config: RiskConfig,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

impl RiskModel {
    pub fn new(returns: Vec<Decimal>, config: RiskConfig) -> RelvalResult<Self> {
        if returns.is_empty() {
            return Err(RelvalError::InvalidInput {
                field: "returns".into(),
                reason: "Return series must contain at least one observation".into(),
            });
        }
        check_return_range("returns", &returns)?;
        config.validate()?;
        Ok(RiskModel {
            returns,
            market_returns: None,
            config,
        })
    }

    /// Attach a market series for beta. It must line up period for period.
    pub fn with_market(mut self, market_returns: Vec<Decimal>) -> RelvalResult<Self> {
        if market_returns.len() != self.returns.len() {
            return Err(RelvalError::InvalidInput {
                field: "market_returns".into(),
                reason: format!(
                    "Market series has {} observations, return series has {}",
                    market_returns.len(),
                    self.returns.len()
                ),
            });
        }
        check_return_range("market_returns", &market_returns)?;
        self.market_returns = Some(market_returns);
        Ok(self)
    }

    pub fn returns(&self) -> &[Decimal] {
        &self.returns
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn periods_per_year(&self) -> Decimal {
        self.config.periods_per_year()
    }

    fn mean_return(&self) -> Decimal {
        mean(&self.returns).unwrap_or(Decimal::ZERO)
    }

    pub fn annualised_return(&self) -> Rate {
        self.mean_return() * self.periods_per_year()
    }

    /// Sample standard deviation x sqrt(periods per year); 0 for one observation.
    pub fn volatility(&self) -> Rate {
        let variance = sample_variance(&self.returns, self.mean_return()).unwrap_or(Decimal::ZERO);
        sqrt_decimal(variance) * sqrt_decimal(self.periods_per_year())
    }

    /// Historical VaR: the (1 - confidence) quantile of the returns,
    /// interpolated between order statistics.
    pub fn var(&self, confidence: Rate) -> RelvalResult<Rate> {
        check_confidence(confidence)?;
        quantile(&self.returns, Decimal::ONE - confidence)
            .ok_or_else(|| RelvalError::InsufficientData("Empty return series".into()))
    }

    /// Mean of the returns at or below VaR, or VaR itself when none are.
    pub fn cvar(&self, confidence: Rate) -> RelvalResult<Rate> {
        let var = self.var(confidence)?;
        let tail: Vec<Decimal> = self.returns.iter().copied().filter(|r| *r <= var).collect();
        Ok(mean(&tail).unwrap_or(var))
    }

    pub fn sharpe_ratio(&self) -> Decimal {
        let vol = self.volatility();
        if vol.is_zero() {
            return Decimal::ZERO;
        }
        saturating_div(self.annualised_return() - self.config.risk_free_rate, vol)
    }

    /// Excess annual return over `target` per unit of annualised downside
    /// deviation. Returns below `target / periods` form the downside set.
    pub fn sortino_ratio(&self, target: Rate) -> Decimal {
        let periods = self.periods_per_year();
        let threshold = target / periods;
        let downside: Vec<Decimal> = self
            .returns
            .iter()
            .copied()
            .filter(|r| *r < threshold)
            .collect();

        let Some(downside_mean) = mean(&downside) else {
            return Decimal::ZERO;
        };
        let downside_dev =
            sqrt_decimal(population_variance(&downside, downside_mean).unwrap_or(Decimal::ZERO))
                * sqrt_decimal(periods);
        if downside_dev.is_zero() {
            return Decimal::ZERO;
        }
        saturating_div(self.annualised_return() - target, downside_dev)
    }

    /// Minimum of (cum - running max) / running max over the compounded curve.
    /// The running max starts at the first compounded value.
    ///
    /// The curve is rebased to 1 at every positive peak, so long compounding
    /// runs stay in range; a trough below the `Decimal` range saturates.
    pub fn max_drawdown(&self) -> Rate {
        let mut cumulative = Decimal::ONE;
        let mut running_max: Option<Decimal> = None;
        let mut max_dd = Decimal::ZERO;

        for r in &self.returns {
            let growth = Decimal::ONE + r;
            cumulative = cumulative.checked_mul(growth).unwrap_or(
                if cumulative.is_sign_negative() == growth.is_sign_negative() {
                    Decimal::MAX
                } else {
                    Decimal::MIN
                },
            );

            match running_max {
                Some(peak) if peak >= cumulative => {
                    if peak > Decimal::ZERO {
                        let dd = cumulative
                            .checked_sub(peak)
                            .map_or(Decimal::MIN, |d| d / peak);
                        max_dd = max_dd.min(dd);
                    }
                }
                _ => {
                    if cumulative > Decimal::ZERO {
                        cumulative = Decimal::ONE;
                    }
                    running_max = Some(cumulative);
                }
            }
        }

        max_dd
    }

    /// Sample covariance with the market over sample market variance.
    /// `None` without a market series, 0 when the market does not move.
    pub fn beta(&self) -> Option<Decimal> {
        let market = self.market_returns.as_ref()?;
        let market_mean = mean(market).unwrap_or(Decimal::ZERO);
        let market_var = sample_variance(market, market_mean).unwrap_or(Decimal::ZERO);
        if market_var.is_zero() {
            return Some(Decimal::ZERO);
        }
        let cov = sample_covariance(&self.returns, market, self.mean_return(), market_mean)?;
        Some(saturating_div(cov, market_var))
    }

    pub fn risk_metrics(&self, confidence: Rate) -> RelvalResult<RiskMetrics> {
        Ok(RiskMetrics {
            observations: self.returns.len(),
            periods_per_year: self.periods_per_year(),
            annualised_return: self.annualised_return(),
            volatility: self.volatility(),
            sharpe_ratio: self.sharpe_ratio(),
            sortino_ratio: self.sortino_ratio(self.config.sortino_target),
            max_drawdown: self.max_drawdown(),
            confidence_level: confidence,
            var: self.var(confidence)?,
            cvar: self.cvar(confidence)?,
            beta: self.beta(),
        })
    }
}

/// Quotient clamped to the `Decimal` range for near-zero denominators.
fn saturating_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(
        if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        },
    )
}

fn check_return_range(field: &str, returns: &[Decimal]) -> RelvalResult<()> {
    if let Some(r) = returns.iter().find(|r| r.abs() > MAX_ABS_RETURN) {
        return Err(RelvalError::InvalidInput {
            field: field.into(),
            reason: format!("Return {r} is outside +/-{MAX_ABS_RETURN}"),
        });
    }
    Ok(())
}

fn check_confidence(confidence: Rate) -> RelvalResult<()> {
    if confidence <= Decimal::ZERO || confidence >= Decimal::ONE {
        return Err(RelvalError::InvalidInput {
            field: "confidence_level".into(),
            reason: "Confidence level must be between 0 and 1 (exclusive)".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Calculate volatility, Sharpe, Sortino, drawdown, historical VaR / CVaR
/// and (with a market series) beta.
pub fn calculate_risk_metrics(
    input: &RiskMetricsInput,
) -> RelvalResult<ComputationOutput<RiskMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut model = RiskModel::new(input.returns.clone(), input.config.clone())?;
    if let Some(market) = &input.market_returns {
        model = model.with_market(market.clone())?;
    }
    let metrics = model.risk_metrics(input.confidence_level)?;

    let n = metrics.observations;
    if n < 2 {
        warnings.push("Volatility needs at least 2 observations; reported as 0".into());
    }
    if n < MIN_TAIL_OBSERVATIONS {
        warnings.push(format!(
            "Only {n} observations; historical VaR/CVaR tail estimates are unreliable"
        ));
    }
    if metrics.sortino_ratio.is_zero() && n >= 2 {
        warnings.push("No downside dispersion below the Sortino target; ratio reported as 0".into());
    }
    if metrics.beta == Some(Decimal::ZERO) {
        warnings.push("Market series has zero variance; beta reported as 0".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Historical simulation VaR/CVaR, annualised Sharpe/Sortino, compounded max drawdown, OLS beta",
        &serde_json::json!({
            "frequency": input.config.frequency,
            "periods_per_year": model.periods_per_year().to_string(),
            "risk_free_rate": input.config.risk_free_rate.to_string(),
            "sortino_target": input.config.sortino_target.to_string(),
            "confidence_level": input.confidence_level.to_string(),
            "var_quantile": "linear interpolation at q x (n - 1)",
            "volatility": "sample standard deviation",
        }),
        warnings,
        elapsed,
        metrics,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::config::ReturnFrequency;

    fn model(returns: Vec<Decimal>) -> RiskModel {
        RiskModel::new(returns, RiskConfig::default()).unwrap()
    }

    fn monthly(returns: Vec<Decimal>) -> RiskModel {
        let config = RiskConfig {
            frequency: ReturnFrequency::Monthly,
            ..Default::default()
        };
        RiskModel::new(returns, config).unwrap()
    }

    fn five_point() -> Vec<Decimal> {
        vec![dec!(0.04), dec!(-0.05), dec!(0.01), dec!(-0.02), dec!(0.03)]
    }

    #[test]
    fn test_var_and_cvar_five_points() {
        let m = model(five_point());
        assert_eq!(m.var(dec!(0.95)).unwrap(), dec!(-0.044));
        assert_eq!(m.cvar(dec!(0.95)).unwrap(), dec!(-0.05));
    }

    #[test]
    fn test_cvar_at_or_below_var() {
        let m = model(five_point());
        for c in [dec!(0.5), dec!(0.75), dec!(0.9), dec!(0.99)] {
            assert!(m.cvar(c).unwrap() <= m.var(c).unwrap());
        }
    }

    #[test]
    fn test_confidence_bounds() {
        let m = model(five_point());
        assert!(m.var(Decimal::ZERO).is_err());
        assert!(m.var(Decimal::ONE).is_err());
        assert!(m.cvar(dec!(1.2)).is_err());
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(RiskModel::new(vec![], RiskConfig::default()).is_err());
    }

    #[test]
    fn test_volatility_sample_std() {
        let m = model(vec![dec!(0.01), dec!(-0.01)]);
        // sqrt(0.0002 * 252) = sqrt(0.0504)
        assert!((m.volatility() - dec!(0.224499)).abs() < dec!(0.00001));
        assert_eq!(model(vec![dec!(0.02)]).volatility(), Decimal::ZERO);
    }

    #[test]
    fn test_sharpe_zero_for_flat_series() {
        let m = model(vec![dec!(0.001); 10]);
        assert_eq!(m.volatility(), Decimal::ZERO);
        assert_eq!(m.sharpe_ratio(), Decimal::ZERO);
    }

    #[test]
    fn test_sortino_downside_population_std() {
        let m = monthly(vec![dec!(0.02), dec!(-0.01), dec!(0.03), dec!(-0.03)]);
        // ann mean 0.03; downside std 0.01 * sqrt(12)
        let s = m.sortino_ratio(Decimal::ZERO);
        assert!((s - dec!(0.866025)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_sortino_zero_without_downside() {
        let m = monthly(vec![dec!(0.01), dec!(0.02), Decimal::ZERO]);
        assert_eq!(m.sortino_ratio(Decimal::ZERO), Decimal::ZERO);
        // single downside observation has no dispersion
        let m = monthly(vec![dec!(0.01), dec!(-0.02)]);
        assert_eq!(m.sortino_ratio(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_max_drawdown() {
        let m = model(vec![dec!(0.10), dec!(-0.20), dec!(0.05), dec!(-0.15)]);
        // peak 1.1, trough 0.7854
        assert_eq!(m.max_drawdown(), dec!(-0.286));
    }

    #[test]
    fn test_drawdown_zero_for_gains() {
        let m = model(vec![dec!(0.01), Decimal::ZERO, dec!(0.03)]);
        assert_eq!(m.max_drawdown(), Decimal::ZERO);
    }

    #[test]
    fn test_drawdown_measured_from_first_close() {
        // the curve starts at 0.9, so the initial loss is not a drawdown
        let m = model(vec![dec!(-0.10), dec!(0.05)]);
        assert_eq!(m.max_drawdown(), Decimal::ZERO);
    }

    #[test]
    fn test_drawdown_survives_long_compounding() {
        // 2^120 is far beyond the Decimal range
        let m = model(vec![dec!(1.0); 120]);
        assert_eq!(m.max_drawdown(), Decimal::ZERO);

        let mut returns = vec![dec!(1.0); 120];
        returns.push(dec!(-0.5));
        assert_eq!(model(returns).max_drawdown(), dec!(-0.5));
    }

    #[test]
    fn test_doubling_series_metrics_do_not_overflow() {
        let input = RiskMetricsInput {
            returns: vec![dec!(1.0); 120],
            market_returns: None,
            confidence_level: dec!(0.95),
            config: RiskConfig::default(),
        };
        let out = calculate_risk_metrics(&input).unwrap();
        assert_eq!(out.result.max_drawdown, Decimal::ZERO);
        assert_eq!(out.result.var, dec!(1.0));
        assert_eq!(out.result.volatility, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_returns_rejected() {
        assert!(RiskModel::new(vec![dec!(0.01), Decimal::MAX], RiskConfig::default()).is_err());
        let err = model(vec![dec!(0.01), dec!(0.02)])
            .with_market(vec![dec!(0.01), dec!(-2_000_000)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_ratio_against_near_zero_deviation_saturates() {
        let tiny = dec!(0.0000000000000000000000000001);
        assert_eq!(saturating_div(dec!(10), tiny), Decimal::MAX);
        assert_eq!(saturating_div(dec!(-10), tiny), Decimal::MIN);
        assert_eq!(saturating_div(dec!(3), dec!(2)), dec!(1.5));
    }

    #[test]
    fn test_beta() {
        let m = model(vec![dec!(0.02), dec!(0.06)])
            .with_market(vec![dec!(0.01), dec!(0.03)])
            .unwrap();
        assert_eq!(m.beta(), Some(dec!(2)));

        let flat = model(vec![dec!(0.02), dec!(0.06)])
            .with_market(vec![dec!(0.01), dec!(0.01)])
            .unwrap();
        assert_eq!(flat.beta(), Some(Decimal::ZERO));

        assert_eq!(model(five_point()).beta(), None);
    }

    #[test]
    fn test_market_length_mismatch() {
        let err = model(five_point()).with_market(vec![dec!(0.01)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_envelope_warnings() {
        let input = RiskMetricsInput {
            returns: five_point(),
            market_returns: None,
            confidence_level: dec!(0.95),
            config: RiskConfig::default(),
        };
        let out = calculate_risk_metrics(&input).unwrap();
        assert_eq!(out.result.observations, 5);
        assert_eq!(out.result.var, dec!(-0.044));
        assert!(out.warnings.iter().any(|w| w.contains("unreliable")));
    }

    #[test]
    fn test_input_json_defaults() {
        let input: RiskMetricsInput =
            serde_json::from_str(r#"{"returns": ["0.01", "-0.02", "0.015"]}"#).unwrap();
        assert_eq!(input.confidence_level, dec!(0.95));
        assert_eq!(input.config.periods_per_year(), dec!(252));
        assert!(calculate_risk_metrics(&input).is_ok());
    }
}
