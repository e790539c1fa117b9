//! Descriptive statistics over `Decimal` slices.
//!
//! Shared by the risk model and the aggregators. Every function degrades to
//! zero (or `None`) on inputs too short to define the statistic instead of
//! dividing by zero, and returns `None` when an intermediate sum leaves the
//! `Decimal` range.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

/// Arithmetic mean; `None` for an empty slice or an overflowing sum.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    Some(sum / Decimal::from(values.len() as i64))
}

/// Median of the values; `None` for an empty slice.
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let n = sorted.len();
    if n % 2 == 0 {
        let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
        Some(
            lo.checked_add(hi)
                .map_or_else(|| lo + (hi - lo) / dec!(2), |sum| sum / dec!(2)),
        )
    } else {
        Some(sorted[n / 2])
    }
}

/// Sum of (x - x_mean)(y - y_mean) over paired values, checked at every step.
fn sum_of_cross_deviations(
    x: &[Decimal],
    y: &[Decimal],
    x_mean: Decimal,
    y_mean: Decimal,
) -> Option<Decimal> {
    x.iter().zip(y.iter()).try_fold(Decimal::ZERO, |acc, (xi, yi)| {
        let dx = xi.checked_sub(x_mean)?;
        let dy = yi.checked_sub(y_mean)?;
        acc.checked_add(dx.checked_mul(dy)?)
    })
}

/// Sample variance (n-1 denominator); 0 below two observations.
pub fn sample_variance(data: &[Decimal], mean: Decimal) -> Option<Decimal> {
    let n = data.len();
    if n < 2 {
        return Some(Decimal::ZERO);
    }
    let sum_sq = sum_of_cross_deviations(data, data, mean, mean)?;
    Some(sum_sq / Decimal::from((n - 1) as i64))
}

/// Population variance (n denominator)
pub fn population_variance(data: &[Decimal], mean: Decimal) -> Option<Decimal> {
    let n = data.len();
    if n == 0 {
        return Some(Decimal::ZERO);
    }
    let sum_sq = sum_of_cross_deviations(data, data, mean, mean)?;
    Some(sum_sq / Decimal::from(n as i64))
}

/// Covariance between two series (sample, n-1)
pub fn sample_covariance(
    x: &[Decimal],
    y: &[Decimal],
    x_mean: Decimal,
    y_mean: Decimal,
) -> Option<Decimal> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Some(Decimal::ZERO);
    }
    let sum = sum_of_cross_deviations(x, y, x_mean, y_mean)?;
    Some(sum / Decimal::from((n - 1) as i64))
}

pub fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// `q` is in [0, 1]; the position in the sorted data is `q * (n - 1)`.
pub fn quantile(values: &[Decimal], q: Decimal) -> Option<Decimal> {
    if values.is_empty() || q < Decimal::ZERO || q > Decimal::ONE {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let last = sorted.len() - 1;

    let position = q * Decimal::from(last as i64);
    let lower = position.floor().to_usize().unwrap_or(0).min(last);
    let upper = (lower + 1).min(last);
    let frac = position - Decimal::from(lower as i64);

    let step = sorted[upper].checked_sub(sorted[lower])?.checked_mul(frac)?;
    sorted[lower].checked_add(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        let v = vec![dec!(3), dec!(1), dec!(2), dec!(10)];
        assert_eq!(mean(&v), Some(dec!(4)));
        assert_eq!(median(&v), Some(dec!(2.5)));
        assert_eq!(median(&[dec!(5), dec!(1), dec!(3)]), Some(dec!(3)));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_variances() {
        let v = vec![dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        let m = mean(&v).unwrap();
        assert_eq!(m, dec!(5));
        assert_eq!(population_variance(&v, m), Some(dec!(4)));
        assert_eq!(sample_variance(&v, m), Some(dec!(32) / dec!(7)));
        assert_eq!(sample_variance(&[dec!(1)], dec!(1)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_overflowing_sums_are_none() {
        assert_eq!(median(&[Decimal::MAX, Decimal::MAX]), Some(Decimal::MAX));
        let huge = vec![Decimal::MAX, Decimal::MAX];
        assert_eq!(mean(&huge), None);

        let wide = vec![
            dec!(-100_000_000_000_000_000_000),
            dec!(100_000_000_000_000_000_000),
        ];
        let m = mean(&wide).unwrap();
        assert_eq!(m, Decimal::ZERO);
        // (1e20)^2 is beyond the Decimal range
        assert_eq!(sample_variance(&wide, m), None);
        assert_eq!(population_variance(&wide, m), None);
        assert_eq!(sample_covariance(&wide, &wide, m, m), None);
    }

    #[test]
    fn test_quantile_interpolates() {
        let v = vec![dec!(0.04), dec!(-0.05), dec!(0.01), dec!(-0.02), dec!(0.03)];
        // position 0.05 * 4 = 0.2 between -0.05 and -0.02
        assert_eq!(quantile(&v, dec!(0.05)), Some(dec!(-0.044)));
        assert_eq!(quantile(&v, Decimal::ZERO), Some(dec!(-0.05)));
        assert_eq!(quantile(&v, Decimal::ONE), Some(dec!(0.04)));
        assert_eq!(quantile(&v, dec!(0.5)), Some(dec!(0.01)));
    }

    #[test]
    fn test_quantile_single_value() {
        assert_eq!(quantile(&[dec!(0.02)], dec!(0.05)), Some(dec!(0.02)));
        assert_eq!(quantile(&[], dec!(0.05)), None);
    }
}
