//! Premium/discount of a stock's multiple against a sector benchmark.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Multiple;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeSignal {
    SignificantlyUndervalued,
    ModeratelyUndervalued,
    FairValued,
    ModeratelyOvervalued,
    SignificantlyOvervalued,
}

impl std::fmt::Display for RelativeSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelativeSignal::SignificantlyUndervalued => write!(f, "Significantly Undervalued"),
            RelativeSignal::ModeratelyUndervalued => write!(f, "Moderately Undervalued"),
            RelativeSignal::FairValued => write!(f, "Fair Valued"),
            RelativeSignal::ModeratelyOvervalued => write!(f, "Moderately Overvalued"),
            RelativeSignal::SignificantlyOvervalued => write!(f, "Significantly Overvalued"),
        }
    }
}

/// Trading stance implied by the discount to peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerStance {
    StrongBuy,
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    pub multiple: Multiple,
    pub benchmark: Multiple,
    /// (multiple / benchmark - 1) x 100
    pub relative_pct: Decimal,
    pub signal: RelativeSignal,
    pub stance: PeerStance,
}

/// Compare a multiple with its sector (or industry) benchmark.
///
/// `None` unless both values are positive and the relative gap is
/// representable.
pub fn compare_to_benchmark(multiple: Multiple, benchmark: Multiple) -> Option<PeerComparison> {
    if multiple <= Decimal::ZERO || benchmark <= Decimal::ZERO {
        return None;
    }
    let relative_pct = multiple
        .checked_div(benchmark)?
        .checked_sub(Decimal::ONE)?
        .checked_mul(dec!(100))?;

    let signal = if relative_pct < dec!(-15) {
        RelativeSignal::SignificantlyUndervalued
    } else if relative_pct < dec!(-5) {
        RelativeSignal::ModeratelyUndervalued
    } else if relative_pct < dec!(5) {
        RelativeSignal::FairValued
    } else if relative_pct < dec!(15) {
        RelativeSignal::ModeratelyOvervalued
    } else {
        RelativeSignal::SignificantlyOvervalued
    };

    let stance = if relative_pct < dec!(-30) {
        PeerStance::StrongBuy
    } else if relative_pct < dec!(-10) {
        PeerStance::Buy
    } else if relative_pct < dec!(10) {
        PeerStance::Hold
    } else {
        PeerStance::Sell
    };

    Some(PeerComparison {
        multiple,
        benchmark,
        relative_pct,
        signal,
        stance,
    })
}
