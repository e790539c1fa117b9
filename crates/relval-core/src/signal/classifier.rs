//! Five-band valuation classifier.
//!
//! Each multiple is bucketed independently against fixed thresholds:
//!
//! | Metric    | Strong-under | Under      | Fair       | Over       | Strong-over |
//! |-----------|--------------|------------|------------|------------|-------------|
//! | P/E       | < 12         | [12, 15)   | [15, 20)   | [20, 30)   | >= 30       |
//! | P/B       | < 0.8        | [0.8, 1.2) | [1.2, 2.0) | [2.0, 3.0) | >= 3.0      |
//! | P/S       | < 0.5        | [0.5, 1.0) | [1.0, 2.0) | [2.0, 3.0) | >= 3.0      |
//! | EV/EBITDA | < 8          | [8, 12)    | [12, 15)   | [15, 20)   | >= 20       |
//!
//! Undervalued bands weigh 1 each. Overvalued weighs 1 and strong-overvalued
//! weighs 2, so one extreme multiple can outvote a moderate one.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::reference::MultipleType;
use crate::types::{Multiple, ValuationStatus};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Band ordering follows the ratio: a higher multiple never lands in a lower band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Band {
    StrongUndervalued,
    Undervalued,
    Fair,
    Overvalued,
    StrongOvervalued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Strong,
    Moderate,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

/// Classification of one multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSignal {
    pub metric: MultipleType,
    pub value: Multiple,
    pub band: Band,
    pub status: ValuationStatus,
    pub severity: Severity,
    /// Contribution to this signal's side of the tally
    pub weight: u32,
    pub reasoning: String,
}

/// Classification of every present multiple plus the weighted verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSignal {
    pub signals: Vec<ValuationSignal>,
    pub undervalued_count: usize,
    pub fair_count: usize,
    pub overvalued_count: usize,
    pub undervalued_weight: u32,
    pub overvalued_weight: u32,
    /// Number of multiples that were present and positive
    pub metrics_present: usize,
    /// Shares of present metrics, in percent
    pub pct_undervalued: Decimal,
    pub pct_fair: Decimal,
    pub pct_overvalued: Decimal,
    pub recommendation: Recommendation,
}

/// Upper bounds (exclusive) of the first four bands.
#[derive(Debug, Clone, Copy)]
struct BandThresholds {
    strong_under: Decimal,
    under: Decimal,
    fair: Decimal,
    over: Decimal,
}

// ---------------------------------------------------------------------------
// Bands
// ---------------------------------------------------------------------------

impl Band {
    pub fn status(self) -> ValuationStatus {
        match self {
            Band::StrongUndervalued | Band::Undervalued => ValuationStatus::Undervalued,
            Band::Fair => ValuationStatus::Fair,
            Band::Overvalued | Band::StrongOvervalued => ValuationStatus::Overvalued,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Band::StrongUndervalued | Band::StrongOvervalued => Severity::Strong,
            Band::Undervalued | Band::Overvalued => Severity::Moderate,
            Band::Fair => Severity::Neutral,
        }
    }

    pub fn weight(self) -> u32 {
        match self {
            Band::StrongUndervalued | Band::Undervalued | Band::Overvalued => 1,
            Band::StrongOvervalued => 2,
            Band::Fair => 0,
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::StrongUndervalued => write!(f, "Strongly Undervalued"),
            Band::Undervalued => write!(f, "Undervalued"),
            Band::Fair => write!(f, "Fair"),
            Band::Overvalued => write!(f, "Overvalued"),
            Band::StrongOvervalued => write!(f, "Strongly Overvalued"),
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Sell => write!(f, "SELL"),
        }
    }
}

fn thresholds(metric: MultipleType) -> BandThresholds {
    match metric {
        MultipleType::PriceEarnings => BandThresholds {
            strong_under: dec!(12),
            under: dec!(15),
            fair: dec!(20),
            over: dec!(30),
        },
        MultipleType::PriceBook => BandThresholds {
            strong_under: dec!(0.8),
            under: dec!(1.2),
            fair: dec!(2.0),
            over: dec!(3.0),
        },
        MultipleType::PriceSales => BandThresholds {
            strong_under: dec!(0.5),
            under: dec!(1.0),
            fair: dec!(2.0),
            over: dec!(3.0),
        },
        MultipleType::EvEbitda => BandThresholds {
            strong_under: dec!(8),
            under: dec!(12),
            fair: dec!(15),
            over: dec!(20),
        },
    }
}

fn band_for(value: Decimal, t: &BandThresholds) -> Band {
    if value < t.strong_under {
        Band::StrongUndervalued
    } else if value < t.under {
        Band::Undervalued
    } else if value < t.fair {
        Band::Fair
    } else if value < t.over {
        Band::Overvalued
    } else {
        Band::StrongOvervalued
    }
}

fn band_range(band: Band, t: &BandThresholds) -> String {
    match band {
        Band::StrongUndervalued => format!("below {}", t.strong_under),
        Band::Undervalued => format!("{} to {}", t.strong_under, t.under),
        Band::Fair => format!("{} to {}", t.under, t.fair),
        Band::Overvalued => format!("{} to {}", t.fair, t.over),
        Band::StrongOvervalued => format!("{} or above", t.over),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Classify one multiple. `None` when the value is absent, zero or negative.
pub fn classify_metric(metric: MultipleType, value: Option<Multiple>) -> Option<ValuationSignal> {
    let value = value.filter(|v| *v > Decimal::ZERO)?;
    let t = thresholds(metric);
    let band = band_for(value, &t);

    Some(ValuationSignal {
        metric,
        value,
        band,
        status: band.status(),
        severity: band.severity(),
        weight: band.weight(),
        reasoning: format!(
            "{metric} of {} is in the {} band ({})",
            value.round_dp(2),
            band,
            band_range(band, &t)
        ),
    })
}

/// Classify each present multiple and weigh the two sides against each other.
pub fn classify(
    pe: Option<Multiple>,
    pb: Option<Multiple>,
    ps: Option<Multiple>,
    ev_ebitda: Option<Multiple>,
) -> AggregateSignal {
    let signals: Vec<ValuationSignal> = [
        (MultipleType::PriceEarnings, pe),
        (MultipleType::PriceBook, pb),
        (MultipleType::PriceSales, ps),
        (MultipleType::EvEbitda, ev_ebitda),
    ]
    .into_iter()
    .filter_map(|(metric, value)| classify_metric(metric, value))
    .collect();

    let mut undervalued_count = 0usize;
    let mut fair_count = 0usize;
    let mut overvalued_count = 0usize;
    let mut undervalued_weight = 0u32;
    let mut overvalued_weight = 0u32;

    for s in &signals {
        match s.status {
            ValuationStatus::Undervalued => {
                undervalued_count += 1;
                undervalued_weight += s.weight;
            }
            ValuationStatus::Fair => fair_count += 1,
            ValuationStatus::Overvalued => {
                overvalued_count += 1;
                overvalued_weight += s.weight;
            }
        }
    }

    let metrics_present = signals.len();
    let pct = |count: usize| -> Decimal {
        if metrics_present == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(count as i64) / Decimal::from(metrics_present as i64) * dec!(100)
        }
    };

    let recommendation = match undervalued_weight.cmp(&overvalued_weight) {
        std::cmp::Ordering::Greater => Recommendation::Buy,
        std::cmp::Ordering::Less => Recommendation::Sell,
        std::cmp::Ordering::Equal => Recommendation::Hold,
    };

    AggregateSignal {
        pct_undervalued: pct(undervalued_count),
        pct_fair: pct(fair_count),
        pct_overvalued: pct(overvalued_count),
        signals,
        undervalued_count,
        fair_count,
        overvalued_count,
        undervalued_weight,
        overvalued_weight,
        metrics_present,
        recommendation,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn band(metric: MultipleType, v: Decimal) -> Band {
        classify_metric(metric, Some(v)).unwrap().band
    }

    #[test]
    fn test_pe_band_edges() {
        let pe = MultipleType::PriceEarnings;
        assert_eq!(band(pe, dec!(11.99)), Band::StrongUndervalued);
        assert_eq!(band(pe, dec!(12)), Band::Undervalued);
        assert_eq!(band(pe, dec!(15)), Band::Fair);
        assert_eq!(band(pe, dec!(20)), Band::Overvalued);
        assert_eq!(band(pe, dec!(29.99)), Band::Overvalued);
        assert_eq!(band(pe, dec!(30)), Band::StrongOvervalued);
    }

    #[test]
    fn test_other_metric_edges() {
        assert_eq!(band(MultipleType::PriceBook, dec!(0.79)), Band::StrongUndervalued);
        assert_eq!(band(MultipleType::PriceBook, dec!(1.2)), Band::Fair);
        assert_eq!(band(MultipleType::PriceSales, dec!(0.5)), Band::Undervalued);
        assert_eq!(band(MultipleType::PriceSales, dec!(3)), Band::StrongOvervalued);
        assert_eq!(band(MultipleType::EvEbitda, dec!(14.9)), Band::Fair);
        assert_eq!(band(MultipleType::EvEbitda, dec!(15)), Band::Overvalued);
    }

    #[test]
    fn test_bands_monotonic() {
        for metric in MultipleType::ALL {
            let mut last = Band::StrongUndervalued;
            let mut v = dec!(0.05);
            while v < dec!(40) {
                let b = band(metric, v);
                assert!(b >= last, "{metric} band dropped at {v}");
                last = b;
                v += dec!(0.05);
            }
        }
    }

    #[test]
    fn test_non_positive_is_absent() {
        assert!(classify_metric(MultipleType::PriceEarnings, Some(Decimal::ZERO)).is_none());
        assert!(classify_metric(MultipleType::PriceEarnings, Some(dec!(-7))).is_none());
        assert!(classify_metric(MultipleType::PriceEarnings, None).is_none());
    }

    #[test]
    fn test_strong_overvalued_counts_double() {
        // pe 35 strong-over (2) vs pb 0.5 strong-under (1)
        let agg = classify(Some(dec!(35)), Some(dec!(0.5)), None, None);
        assert_eq!(agg.undervalued_weight, 1);
        assert_eq!(agg.overvalued_weight, 2);
        assert_eq!(agg.recommendation, Recommendation::Sell);
        assert_eq!(agg.metrics_present, 2);
        assert_eq!(agg.pct_undervalued, dec!(50));
    }

    #[test]
    fn test_moderate_sides_tie_to_hold() {
        let agg = classify(Some(dec!(13)), Some(dec!(2.5)), None, None);
        assert_eq!(agg.undervalued_weight, 1);
        assert_eq!(agg.overvalued_weight, 1);
        assert_eq!(agg.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_percentages_use_present_metrics() {
        let agg = classify(Some(dec!(16)), None, Some(dec!(0.2)), Some(Decimal::ZERO));
        assert_eq!(agg.metrics_present, 2);
        assert_eq!(agg.fair_count, 1);
        assert_eq!(agg.pct_fair, dec!(50));
        assert_eq!(agg.pct_overvalued, Decimal::ZERO);
    }

    #[test]
    fn test_nothing_present() {
        let agg = classify(None, None, None, None);
        assert_eq!(agg.metrics_present, 0);
        assert_eq!(agg.pct_undervalued, Decimal::ZERO);
        assert_eq!(agg.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_reasoning_mentions_range() {
        let s = classify_metric(MultipleType::EvEbitda, Some(dec!(22.456))).unwrap();
        assert_eq!(
            s.reasoning,
            "EV/EBITDA of 22.46 is in the Strongly Overvalued band (20 or above)"
        );
    }
}
