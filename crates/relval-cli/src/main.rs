mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::health::HealthArgs;
use commands::portfolio::{PortfolioArgs, SectorsArgs};
use commands::reference::ReferenceArgs;
use commands::risk::RiskArgs;
use commands::signal::SignalArgs;
use commands::valuation::{CompareArgs, FinancialsArgs, MetricsArgs};

/// Relative valuation against sector peers
#[derive(Parser)]
#[command(
    name = "relval",
    version,
    about = "Relative valuation against sector peers",
    long_about = "A CLI for relative-valuation analysis with decimal precision. Derives \
                  valuation multiples, implies prices from sector comparables, classifies \
                  and scores multiples, and computes return-series risk, portfolio and \
                  sector aggregates."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Implied prices at every peer statistic for every multiple
    Implied(FinancialsArgs),
    /// Median-based valuation table with per-method status
    Summary(FinancialsArgs),
    /// Derive a stock's own multiples from a market snapshot
    Metrics(MetricsArgs),
    /// Compare a multiple with a sector or custom benchmark
    Compare(CompareArgs),
    /// Five-band classification and composite score of a stock's multiples
    Signal(SignalArgs),
    /// Volatility, Sharpe, Sortino, drawdown, VaR/CVaR and beta of a return series
    Risk(RiskArgs),
    /// Weighted-average multiples of a portfolio
    Portfolio(PortfolioArgs),
    /// Aggregate a stock universe by sector and rank the sectors
    Sectors(SectorsArgs),
    /// Leverage, coverage and liquidity ratios with a health score
    Health(HealthArgs),
    /// Browse the sector multiples and constituents tables
    Reference(ReferenceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Implied(args) => commands::valuation::run_implied(args),
        Commands::Summary(args) => commands::valuation::run_summary(args),
        Commands::Metrics(args) => commands::valuation::run_metrics(args),
        Commands::Compare(args) => commands::valuation::run_compare(args),
        Commands::Signal(args) => commands::signal::run_signal(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Sectors(args) => commands::portfolio::run_sectors(args),
        Commands::Health(args) => commands::health::run_health(args),
        Commands::Reference(args) => commands::reference::run_reference(args),
        Commands::Version => {
            println!("relval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
