use clap::Args;
use serde_json::{json, Value};
use std::sync::Arc;

use relval_core::reference::{Constituents, ReferenceMultiples};

use crate::input;

/// Arguments for browsing the bundled reference data
#[derive(Args)]
pub struct ReferenceArgs {
    /// Show the multiple distribution for one sector
    #[arg(long)]
    pub sector: Option<String>,

    /// Look up the sector of a constituent ticker (e.g. TCS.NS)
    #[arg(long)]
    pub ticker: Option<String>,

    /// List the constituents instead of the sectors
    #[arg(long)]
    pub constituents: bool,

    /// Path to a replacement sector-multiples JSON file
    #[arg(long)]
    pub reference: Option<String>,
}

/// Load the sector table from `--reference`, or the bundled copy.
pub fn load_reference(
    path: &Option<String>,
) -> Result<Arc<ReferenceMultiples>, Box<dyn std::error::Error>> {
    let reference = match path {
        Some(path) => ReferenceMultiples::from_json(&input::file::read_text(path)?)?,
        None => ReferenceMultiples::builtin()?,
    };
    Ok(Arc::new(reference))
}

pub fn run_reference(args: ReferenceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let reference = load_reference(&args.reference)?;

    if let Some(ref ticker) = args.ticker {
        let constituents = Constituents::builtin()?;
        let constituent = constituents
            .get(ticker)
            .ok_or_else(|| format!("Ticker '{}' is not a known constituent", ticker))?;
        return Ok(json!({
            "result": {
                "constituent": constituent,
                "profile": reference.get_sector_multiples(&constituent.sector),
            }
        }));
    }

    if let Some(ref sector) = args.sector {
        let profile = reference
            .profile(sector)
            .ok_or_else(|| format!("Sector '{}' is not in the reference table", sector))?;
        let rows: Vec<Value> = profile
            .multiples
            .iter()
            .map(|(multiple_type, stats)| {
                json!({
                    "multiple": multiple_type.to_string(),
                    "avg": stats.avg,
                    "median": stats.median,
                    "high": stats.high,
                    "low": stats.low,
                })
            })
            .collect();
        return Ok(Value::Array(rows));
    }

    if args.constituents {
        let constituents = Constituents::builtin()?;
        let rows: Vec<Value> = constituents
            .sectors()
            .into_iter()
            .flat_map(|sector| constituents.in_sector(sector))
            .map(|c| serde_json::to_value(c))
            .collect::<Result<_, _>>()?;
        return Ok(Value::Array(rows));
    }

    let rows: Vec<Value> = reference
        .sectors()
        .filter_map(|sector| reference.profile(sector))
        .map(|profile| {
            json!({
                "sector": profile.sector,
                "companies": profile.companies.len(),
                "multiples": profile.multiples.len(),
            })
        })
        .collect();
    Ok(Value::Array(rows))
}
