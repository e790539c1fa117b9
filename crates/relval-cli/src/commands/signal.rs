use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use relval_core::signal::{calculate_valuation_signal, SignalInput};

use crate::input;

/// Arguments for the five-band classification and composite score
#[derive(Args)]
pub struct SignalArgs {
    /// Path to JSON file with pe, pb, ps, ev_ebitda, peg (e.g. `relval metrics` output)
    #[arg(long)]
    pub input: Option<String>,

    #[arg(long)]
    pub pe: Option<Decimal>,

    #[arg(long)]
    pub pb: Option<Decimal>,

    #[arg(long)]
    pub ps: Option<Decimal>,

    #[arg(long)]
    pub ev_ebitda: Option<Decimal>,

    #[arg(long)]
    pub peg: Option<Decimal>,
}

pub fn run_signal(args: SignalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let signal_input = match input::read_payload::<Value>(&args.input)? {
        // Accept a full envelope piped from `relval metrics`
        Some(Value::Object(mut map)) if map.contains_key("result") => {
            serde_json::from_value(map.remove("result").unwrap_or_default())?
        }
        Some(data) => serde_json::from_value(data)?,
        None => SignalInput {
            pe: args.pe,
            pb: args.pb,
            ps: args.ps,
            ev_ebitda: args.ev_ebitda,
            peg: args.peg,
        },
    };

    let result = calculate_valuation_signal(&signal_input)?;
    Ok(serde_json::to_value(result)?)
}
