use clap::Args;
use serde_json::Value;

use relval_core::portfolio::{
    calculate_portfolio_metrics, calculate_sector_analysis, PortfolioInput, SectorAnalysisInput,
};
use relval_core::reference::MultipleType;

use crate::input;

/// Arguments for weighted portfolio multiples
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to JSON file with {"holdings": [{name, weight, pe, pb, ...}]}
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for sector aggregation and ranking
#[derive(Args)]
pub struct SectorsArgs {
    /// Path to JSON file with {"stocks": [{name, sector, pe, pb, ...}]}
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated multiples to rank on (e.g. "PE,PB,EV_EBITDA")
    #[arg(long, value_delimiter = ',')]
    pub rank_by: Option<Vec<String>>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let portfolio: PortfolioInput = input::read_payload(&args.input)?
        .ok_or("--input file is required for portfolio metrics (or pipe JSON via stdin)")?;
    let result = calculate_portfolio_metrics(&portfolio)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_sectors(args: SectorsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut analysis: SectorAnalysisInput = input::read_payload(&args.input)?
        .ok_or("--input file is required for sector analysis (or pipe JSON via stdin)")?;

    if let Some(names) = args.rank_by {
        analysis.ranking_metrics = names
            .iter()
            .map(|name| {
                serde_json::from_value::<MultipleType>(Value::String(name.trim().to_uppercase()))
                    .map_err(|_| format!("Unknown multiple '{}'. Use: PE, PB, PS, EV_EBITDA", name))
            })
            .collect::<Result<_, _>>()?;
    }

    let result = calculate_sector_analysis(&analysis)?;
    Ok(serde_json::to_value(result)?)
}
