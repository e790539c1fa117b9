use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values, in base currency units.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 8.5x EV/EBITDA)
pub type Multiple = Decimal;

/// Scale in which a caller supplies monetary amounts or share counts.
///
/// Everything inside the core is held in base units (currency units and raw
/// share counts); a scale is applied once when data enters the crate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitScale {
    #[default]
    Units,
    Thousands,
    Lakhs,
    Millions,
    Crores,
    Billions,
}

impl UnitScale {
    /// Multiplier converting a value in this scale to base units.
    pub fn factor(&self) -> Decimal {
        match self {
            UnitScale::Units => Decimal::ONE,
            UnitScale::Thousands => dec!(1_000),
            UnitScale::Lakhs => dec!(100_000),
            UnitScale::Millions => dec!(1_000_000),
            UnitScale::Crores => dec!(10_000_000),
            UnitScale::Billions => dec!(1_000_000_000),
        }
    }

    /// `value` in base units; `None` when the product leaves the `Decimal` range.
    pub fn to_base(&self, value: Decimal) -> Option<Decimal> {
        value.checked_mul(self.factor())
    }
}

/// Qualitative valuation status shared by the summary table and the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationStatus {
    Undervalued,
    Fair,
    Overvalued,
}

impl std::fmt::Display for ValuationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValuationStatus::Undervalued => write!(f, "Undervalued"),
            ValuationStatus::Fair => write!(f, "Fair Valued"),
            ValuationStatus::Overvalued => write!(f, "Overvalued"),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
