use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use relval_core::health::{calculate_financial_health, FinancialHealthInput};

use crate::input;

/// Arguments for the leverage, coverage and liquidity check
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct HealthArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Total debt
    #[arg(long)]
    pub total_debt: Option<Decimal>,

    /// Shareholders' equity
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// EBIT
    #[arg(long)]
    pub ebit: Option<Decimal>,

    /// Interest expense
    #[arg(long)]
    pub interest_expense: Option<Decimal>,

    /// Current assets
    #[arg(long)]
    pub current_assets: Option<Decimal>,

    /// Current liabilities
    #[arg(long)]
    pub current_liabilities: Option<Decimal>,

    /// Current assets less inventory
    #[arg(long)]
    pub quick_assets: Option<Decimal>,

    /// Operating cash flow
    #[arg(long)]
    pub operating_cash_flow: Option<Decimal>,

    /// Net income
    #[arg(long)]
    pub net_income: Option<Decimal>,
}

pub fn run_health(args: HealthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let health_input = match input::read_payload(&args.input)? {
        Some(payload) => payload,
        None => FinancialHealthInput {
            total_debt: args.total_debt,
            equity: args.equity,
            ebit: args.ebit,
            interest_expense: args.interest_expense,
            current_assets: args.current_assets,
            current_liabilities: args.current_liabilities,
            quick_assets: args.quick_assets,
            operating_cash_flow: args.operating_cash_flow,
            net_income: args.net_income,
        },
    };

    let result = calculate_financial_health(&health_input)?;
    Ok(serde_json::to_value(result)?)
}
