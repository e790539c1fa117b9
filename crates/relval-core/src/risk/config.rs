use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RelvalError;
use crate::types::Rate;
use crate::RelvalResult;

/// Bounds that keep annualised statistics inside the `Decimal` range.
const MIN_PERIODS_PER_YEAR: Decimal = dec!(0.000001);
const MAX_PERIODS_PER_YEAR: Decimal = dec!(100_000_000);
const MAX_ABS_ANNUAL_RATE: Decimal = dec!(1_000_000);

/// Frequency of return observations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnFrequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            ReturnFrequency::Daily => dec!(252),
            ReturnFrequency::Weekly => dec!(52),
            ReturnFrequency::Monthly => dec!(12),
            ReturnFrequency::Quarterly => dec!(4),
            ReturnFrequency::Annual => dec!(1),
        }
    }
}

/// Annualisation and hurdle settings for a risk model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    #[serde(default)]
    pub frequency: ReturnFrequency,
    /// Overrides the frequency's period count when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods_per_year: Option<Decimal>,
    /// Annual risk-free rate
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: Rate,
    /// Annual Sortino target return
    #[serde(default)]
    pub sortino_target: Rate,
}

fn default_risk_free_rate() -> Rate {
    dec!(0.04)
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            frequency: ReturnFrequency::Daily,
            periods_per_year: None,
            risk_free_rate: default_risk_free_rate(),
            sortino_target: Decimal::ZERO,
        }
    }
}

impl RiskConfig {
    pub fn periods_per_year(&self) -> Decimal {
        self.periods_per_year
            .unwrap_or_else(|| self.frequency.periods_per_year())
    }

    pub(crate) fn validate(&self) -> RelvalResult<()> {
        let periods = self.periods_per_year();
        if periods < MIN_PERIODS_PER_YEAR || periods > MAX_PERIODS_PER_YEAR {
            return Err(RelvalError::InvalidInput {
                field: "periods_per_year".into(),
                reason: format!(
                    "Annualisation factor must be in [{MIN_PERIODS_PER_YEAR}, {MAX_PERIODS_PER_YEAR}]"
                ),
            });
        }
        for (field, rate) in [
            ("risk_free_rate", self.risk_free_rate),
            ("sortino_target", self.sortino_target),
        ] {
            if rate.abs() > MAX_ABS_ANNUAL_RATE {
                return Err(RelvalError::InvalidInput {
                    field: field.into(),
                    reason: format!("Annual rate must be within +/-{MAX_ABS_ANNUAL_RATE}"),
                });
            }
        }
        Ok(())
    }
}
