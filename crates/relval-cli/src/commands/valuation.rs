use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use relval_core::reference::MultipleType;
use relval_core::valuation::{
    calculate_stock_metrics, calculate_valuation_summary, compare_to_benchmark,
    CompanyFinancials, MarketSnapshot, ScaledFinancials, ValuationEngine, ValuationSummaryInput,
};
use relval_core::UnitScale;

use crate::commands::reference::load_reference;
use crate::input;

/// Unit scale accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScaleArg {
    Units,
    Thousands,
    Lakhs,
    Millions,
    Crores,
    Billions,
}

impl From<ScaleArg> for UnitScale {
    fn from(scale: ScaleArg) -> Self {
        match scale {
            ScaleArg::Units => UnitScale::Units,
            ScaleArg::Thousands => UnitScale::Thousands,
            ScaleArg::Lakhs => UnitScale::Lakhs,
            ScaleArg::Millions => UnitScale::Millions,
            ScaleArg::Crores => UnitScale::Crores,
            ScaleArg::Billions => UnitScale::Billions,
        }
    }
}

/// Company financials shared by the valuation subcommands
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FinancialsArgs {
    /// Reference sector (e.g. "IT & Software")
    #[arg(long)]
    pub sector: Option<String>,

    /// Trailing net income
    #[arg(long)]
    pub net_income: Option<Decimal>,

    /// Book value of equity
    #[arg(long)]
    pub book_value: Option<Decimal>,

    /// Revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// EBITDA
    #[arg(long)]
    pub ebitda: Option<Decimal>,

    /// Shares outstanding
    #[arg(long, alias = "shares")]
    pub shares_outstanding: Option<Decimal>,

    /// Current share price
    #[arg(long, alias = "price")]
    pub share_price: Option<Decimal>,

    /// Market capitalisation
    #[arg(long)]
    pub market_cap: Option<Decimal>,

    /// Total debt less cash
    #[arg(long)]
    pub net_debt: Option<Decimal>,

    /// Scale of monetary figures
    #[arg(long, value_enum, default_value_t = ScaleArg::Units)]
    pub monetary_scale: ScaleArg,

    /// Scale of the share count
    #[arg(long, value_enum, default_value_t = ScaleArg::Units)]
    pub share_scale: ScaleArg,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a replacement sector-multiples JSON file
    #[arg(long)]
    pub reference: Option<String>,
}

/// Arguments for deriving a stock's own multiples from a market snapshot
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to JSON snapshot (current_price, trailing_pe, ...)
    #[arg(long)]
    pub input: Option<String>,

    /// Current share price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Trailing P/E
    #[arg(long)]
    pub trailing_pe: Option<Decimal>,

    /// Price to book
    #[arg(long)]
    pub price_to_book: Option<Decimal>,

    /// Price to sales
    #[arg(long)]
    pub price_to_sales: Option<Decimal>,

    /// EV / EBITDA
    #[arg(long)]
    pub ev_to_ebitda: Option<Decimal>,

    /// Dividend yield as a fraction (0.012 = 1.2%)
    #[arg(long)]
    pub dividend_yield: Option<Decimal>,

    /// Earnings growth as a fraction, for PEG
    #[arg(long)]
    pub earnings_growth: Option<Decimal>,
}

/// Arguments for comparing a multiple with a benchmark
#[derive(Args)]
pub struct CompareArgs {
    /// The stock's multiple
    #[arg(long)]
    pub multiple: Decimal,

    /// Benchmark multiple (defaults to the sector average)
    #[arg(long)]
    pub benchmark: Option<Decimal>,

    /// Sector whose average is the benchmark
    #[arg(long)]
    pub sector: Option<String>,

    /// Which multiple: PE, PB, PS, EV_EBITDA
    #[arg(long, default_value = "PE")]
    pub multiple_type: String,

    /// Path to a replacement sector-multiples JSON file
    #[arg(long)]
    pub reference: Option<String>,
}

fn parse_multiple_type(name: &str) -> Result<MultipleType, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.to_uppercase())).map_err(|_| {
        format!("Unknown multiple '{}'. Use: PE, PB, PS, EV_EBITDA", name).into()
    })
}

fn summary_input(args: &FinancialsArgs) -> Result<ValuationSummaryInput, Box<dyn std::error::Error>> {
    if let Some(payload) = input::read_payload(&args.input)? {
        return Ok(payload);
    }
    Ok(ValuationSummaryInput {
        sector: args
            .sector
            .clone()
            .ok_or("--sector is required (or provide --input)")?,
        financials: ScaledFinancials {
            financials: CompanyFinancials {
                market_cap: args.market_cap,
                net_income: args.net_income,
                book_value: args.book_value,
                revenue: args.revenue,
                ebitda: args.ebitda,
                shares_outstanding: args.shares_outstanding,
                share_price: args.share_price,
                net_debt: args.net_debt,
            },
            monetary_scale: args.monetary_scale.into(),
            share_scale: args.share_scale.into(),
        },
    })
}

/// Implied prices at every peer statistic, for every multiple.
pub fn run_implied(args: FinancialsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let summary = summary_input(&args)?;
    let engine = ValuationEngine::new(load_reference(&args.reference)?);
    let valuation = engine.value_company(&summary.financials.normalise(), &summary.sector);
    if !valuation.sector_known {
        return Err(format!("Sector '{}' is not in the reference table", summary.sector).into());
    }
    Ok(serde_json::to_value(valuation)?)
}

/// Median-based valuation table with per-method status.
pub fn run_summary(args: FinancialsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let summary = summary_input(&args)?;
    let engine = ValuationEngine::new(load_reference(&args.reference)?);
    let result = calculate_valuation_summary(&summary, &engine)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snapshot: MarketSnapshot = match input::read_payload(&args.input)? {
        Some(snapshot) => snapshot,
        None => MarketSnapshot {
            current_price: args.price,
            trailing_pe: args.trailing_pe,
            price_to_book: args.price_to_book,
            price_to_sales: args.price_to_sales,
            ev_to_ebitda: args.ev_to_ebitda,
            dividend_yield: args.dividend_yield,
            earnings_growth: args.earnings_growth,
            ..Default::default()
        },
    };
    let result = calculate_stock_metrics(&snapshot)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let benchmark = match (args.benchmark, &args.sector) {
        (Some(benchmark), _) => benchmark,
        (None, Some(sector)) => {
            let multiple_type = parse_multiple_type(&args.multiple_type)?;
            let reference = load_reference(&args.reference)?;
            reference
                .get_sector_multiples(sector)
                .stats(multiple_type)
                .map(|s| s.avg)
                .ok_or_else(|| format!("No {} benchmark for sector '{}'", multiple_type, sector))?
        }
        (None, None) => return Err("Provide --benchmark or --sector".into()),
    };

    let comparison = compare_to_benchmark(args.multiple, benchmark)
        .ok_or("Multiple and benchmark must both be positive")?;
    Ok(serde_json::json!({ "result": comparison }))
}
