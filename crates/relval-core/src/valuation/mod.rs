//! Multiples and comparable-company implied valuation.

pub mod financials;
pub mod implied;
pub mod multiples;
pub mod relative;
pub mod summary;

pub use financials::{CompanyFinancials, MarketSnapshot, ScaledFinancials};
pub use implied::{
    compute_implied_valuation, CompanyValuation, ImpliedValuationResult, ImpliedValuations,
    UnavailableMultiple, ValuationEngine,
};
pub use multiples::{calculate_stock_metrics, stock_metrics, StockMetrics};
pub use relative::{compare_to_benchmark, PeerComparison, PeerStance, RelativeSignal};
pub use summary::{
    calculate_valuation_summary, SummaryRow, ValuationSummaryInput, ValuationSummaryOutput,
};
