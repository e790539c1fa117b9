use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use relval_core::risk::{calculate_risk_metrics, ReturnFrequency, RiskConfig, RiskMetricsInput};

use crate::input;

/// Arguments for return-series risk metrics
#[derive(Args)]
pub struct RiskArgs {
    /// Path to JSON file: an array of returns or a full risk input object
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated periodic returns (e.g. "0.05,0.02,-0.01,0.03")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,

    /// Comma-separated market returns over the same periods, for beta
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub market_returns: Option<Vec<Decimal>>,

    /// Confidence level for VaR/CVaR (e.g. 0.95 for 95%)
    #[arg(long, default_value = "0.95")]
    pub confidence: Decimal,

    /// Annual risk-free rate
    #[arg(long, default_value = "0.04")]
    pub risk_free_rate: Decimal,

    /// Annual Sortino target return
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub sortino_target: Decimal,

    /// Return frequency for annualisation: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "daily")]
    pub frequency: String,

    /// Override the number of periods per year
    #[arg(long)]
    pub periods_per_year: Option<Decimal>,
}

fn parse_frequency(frequency: &str) -> Result<ReturnFrequency, Box<dyn std::error::Error>> {
    match frequency.to_lowercase().as_str() {
        "daily" => Ok(ReturnFrequency::Daily),
        "weekly" => Ok(ReturnFrequency::Weekly),
        "monthly" => Ok(ReturnFrequency::Monthly),
        "quarterly" => Ok(ReturnFrequency::Quarterly),
        "annual" | "annually" => Ok(ReturnFrequency::Annual),
        _ => Err(format!(
            "Unknown frequency '{}'. Use: daily, weekly, monthly, quarterly, annual",
            frequency
        )
        .into()),
    }
}

pub fn run_risk(args: RiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = RiskConfig {
        frequency: parse_frequency(&args.frequency)?,
        periods_per_year: args.periods_per_year,
        risk_free_rate: args.risk_free_rate,
        sortino_target: args.sortino_target,
    };

    let risk_input = match input::read_payload::<Value>(&args.input)? {
        // A bare array carries only the returns; flags supply the rest
        Some(Value::Array(arr)) => RiskMetricsInput {
            returns: serde_json::from_value(Value::Array(arr))?,
            market_returns: args.market_returns,
            confidence_level: args.confidence,
            config,
        },
        Some(data) => serde_json::from_value(data)?,
        None => RiskMetricsInput {
            returns: args
                .returns
                .ok_or("Provide --returns or --input file or pipe JSON via stdin")?,
            market_returns: args.market_returns,
            confidence_level: args.confidence,
            config,
        },
    };

    let result = calculate_risk_metrics(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}
