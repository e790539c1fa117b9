//! Additive 0-100 valuation score.
//!
//! Starts at 50 and moves by a fixed number of points for each multiple that
//! is cheap or expensive; higher means more undervalued. This is a coarser
//! measure than the five-band classifier and is reported next to it, not
//! reconciled with it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Multiple, ValuationStatus};

const BASE_SCORE: Decimal = dec!(50);
const MAX_SCORE: Decimal = dec!(100);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompositeInputs {
    pub pe: Option<Multiple>,
    pub pb: Option<Multiple>,
    pub ps: Option<Multiple>,
    pub ev_ebitda: Option<Multiple>,
    pub peg: Option<Multiple>,
}

/// Points one factor added to or removed from the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub factor: String,
    pub value: Multiple,
    pub points: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// 0-100, clamped
    pub score: Decimal,
    /// Non-zero contributions only
    pub contributions: Vec<ScoreContribution>,
    /// > 70 undervalued, > 50 fair, otherwise overvalued
    pub interpretation: ValuationStatus,
}

/// (factor, cheap below, points when cheap, optional (expensive above, penalty))
type Rule = (&'static str, Decimal, Decimal, Option<(Decimal, Decimal)>);

fn rules() -> [Rule; 5] {
    [
        ("P/E", dec!(15), dec!(10), Some((dec!(25), dec!(-10)))),
        ("P/B", dec!(1), dec!(15), Some((dec!(3), dec!(-10)))),
        ("P/S", dec!(1), dec!(10), Some((dec!(3), dec!(-10)))),
        ("EV/EBITDA", dec!(8), dec!(10), Some((dec!(15), dec!(-10)))),
        ("PEG", dec!(1), dec!(10), None),
    ]
}

/// Score a stock from its multiples. Absent or non-positive multiples add
/// nothing.
pub fn composite_score(inputs: &CompositeInputs) -> CompositeScore {
    let values = [
        inputs.pe,
        inputs.pb,
        inputs.ps,
        inputs.ev_ebitda,
        inputs.peg,
    ];

    let mut score = BASE_SCORE;
    let mut contributions = Vec::new();

    for ((factor, cheap_below, cheap_points, expensive), value) in rules().into_iter().zip(values)
    {
        let Some(value) = value.filter(|v| *v > Decimal::ZERO) else {
            continue;
        };
        let points = if value < cheap_below {
            cheap_points
        } else {
            match expensive {
                Some((above, penalty)) if value > above => penalty,
                _ => Decimal::ZERO,
            }
        };
        if !points.is_zero() {
            score += points;
            contributions.push(ScoreContribution {
                factor: factor.to_string(),
                value,
                points,
            });
        }
    }

    let score = score.clamp(Decimal::ZERO, MAX_SCORE);
    let interpretation = if score > dec!(70) {
        ValuationStatus::Undervalued
    } else if score > BASE_SCORE {
        ValuationStatus::Fair
    } else {
        ValuationStatus::Overvalued
    };

    CompositeScore {
        score,
        contributions,
        interpretation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_without_inputs() {
        let s = composite_score(&CompositeInputs::default());
        assert_eq!(s.score, dec!(50));
        assert!(s.contributions.is_empty());
        assert_eq!(s.interpretation, ValuationStatus::Overvalued);
    }

    #[test]
    fn test_cheap_stock_clamps_at_100() {
        let s = composite_score(&CompositeInputs {
            pe: Some(dec!(9)),
            pb: Some(dec!(0.6)),
            ps: Some(dec!(0.5)),
            ev_ebitda: Some(dec!(5)),
            peg: Some(dec!(0.5)),
        });
        // 50 + 10 + 15 + 10 + 10 + 10 = 105
        assert_eq!(s.score, dec!(100));
        assert_eq!(s.contributions.len(), 5);
        assert_eq!(s.interpretation, ValuationStatus::Undervalued);
    }

    #[test]
    fn test_expensive_stock() {
        let s = composite_score(&CompositeInputs {
            pe: Some(dec!(40)),
            pb: Some(dec!(8)),
            ps: Some(dec!(6)),
            ev_ebitda: Some(dec!(30)),
            peg: Some(dec!(3)),
        });
        assert_eq!(s.score, dec!(10));
        assert_eq!(s.contributions.len(), 4);
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let s = composite_score(&CompositeInputs {
            pe: Some(dec!(15)),
            pb: Some(dec!(3)),
            ps: Some(dec!(1)),
            ev_ebitda: Some(dec!(15)),
            peg: Some(dec!(1)),
        });
        assert_eq!(s.score, dec!(50));
    }

    #[test]
    fn test_pb_carries_extra_weight() {
        let s = composite_score(&CompositeInputs {
            pb: Some(dec!(0.9)),
            ev_ebitda: Some(dec!(16)),
            ..Default::default()
        });
        // 50 + 15 - 10
        assert_eq!(s.score, dec!(55));
        assert_eq!(s.interpretation, ValuationStatus::Fair);
    }

    #[test]
    fn test_negative_multiples_ignored() {
        let s = composite_score(&CompositeInputs {
            pe: Some(dec!(-5)),
            peg: Some(dec!(-0.3)),
            ..Default::default()
        });
        assert_eq!(s.score, dec!(50));
    }
}
