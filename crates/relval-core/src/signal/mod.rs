pub mod classifier;
pub mod composite;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::reference::MultipleType;
use crate::types::{with_metadata, ComputationOutput, Multiple};
use crate::RelvalResult;

pub use classifier::{
    classify, classify_metric, AggregateSignal, Band, Recommendation, Severity, ValuationSignal,
};
pub use composite::{composite_score, CompositeInputs, CompositeScore, ScoreContribution};

/// A stock's own multiples. Field names match `StockMetrics`, so its JSON can
/// be fed in directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalInput {
    #[serde(default)]
    pub pe: Option<Multiple>,
    #[serde(default)]
    pub pb: Option<Multiple>,
    #[serde(default)]
    pub ps: Option<Multiple>,
    #[serde(default)]
    pub ev_ebitda: Option<Multiple>,
    #[serde(default)]
    pub peg: Option<Multiple>,
}

/// Both scoring systems, side by side. They are computed independently and
/// can disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalOutput {
    pub classification: AggregateSignal,
    pub composite: CompositeScore,
}

/// Five-band classification and the 0-100 composite score for one stock.
pub fn calculate_valuation_signal(
    input: &SignalInput,
) -> RelvalResult<ComputationOutput<SignalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let classification = classify(input.pe, input.pb, input.ps, input.ev_ebitda);
    let composite = composite_score(&CompositeInputs {
        pe: input.pe,
        pb: input.pb,
        ps: input.ps,
        ev_ebitda: input.ev_ebitda,
        peg: input.peg,
    });

    for (metric, value) in [
        (MultipleType::PriceEarnings, input.pe),
        (MultipleType::PriceBook, input.pb),
        (MultipleType::PriceSales, input.ps),
        (MultipleType::EvEbitda, input.ev_ebitda),
    ] {
        if value.map_or(true, |v| v <= Decimal::ZERO) {
            warnings.push(format!(
                "{metric} missing or not positive; excluded from the classification"
            ));
        }
    }
    if classification.metrics_present == 0 {
        warnings.push("No usable multiples; recommendation defaults to Hold".into());
    }

    let output = SignalOutput {
        classification,
        composite,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Five-band multiple classification with weighted tallies; additive composite score",
        &serde_json::json!({
            "weights": {
                "strong_undervalued": 1,
                "undervalued": 1,
                "fair": 0,
                "overvalued": 1,
                "strong_overvalued": 2,
            },
            "composite_base": 50,
            "composite_range": [0, 100],
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signal_output_carries_both_scores() {
        let input = SignalInput {
            pe: Some(dec!(10)),
            pb: Some(dec!(0.7)),
            ps: Some(dec!(0.4)),
            ev_ebitda: Some(dec!(6)),
            peg: Some(dec!(0.8)),
        };
        let out = calculate_valuation_signal(&input).unwrap();
        assert_eq!(out.result.classification.recommendation, Recommendation::Buy);
        assert_eq!(out.result.composite.score, dec!(100));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_signal_input_accepts_stock_metrics_json() {
        let json = r#"{"pe": "18.2", "pb": null, "ev_ebitda": "9", "dividend_yield_pct": "1.5"}"#;
        let input: SignalInput = serde_json::from_str(json).unwrap();
        let out = calculate_valuation_signal(&input).unwrap();
        assert_eq!(out.result.classification.metrics_present, 2);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_empty_input_holds() {
        let out = calculate_valuation_signal(&SignalInput::default()).unwrap();
        assert_eq!(out.result.classification.recommendation, Recommendation::Hold);
        assert_eq!(out.result.composite.score, dec!(50));
        assert_eq!(out.warnings.len(), 5);
    }
}
