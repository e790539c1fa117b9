pub mod solvency;

pub use solvency::{
    assess_financial_health, calculate_financial_health, CoverageStrength, FinancialHealth,
    FinancialHealthInput, LeverageLevel, LiquidityLevel,
};
