//! Float kernels backing the statistical and arithmetic operations.
//!
//! NaN follows IEEE 754 propagation throughout: nothing here filters missing
//! values, callers decide what reaches these functions.

use crate::{ArithmeticOp, ColumnError};

#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bessel-corrected (n - 1) standard deviation. NaN for fewer than two values.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let m = mean(values);
    let (squares, compensation) = values.iter().fold((0.0, 0.0), |(ss, comp), v| {
        let d = v - m;
        (ss + d * d, comp + d)
    });
    ((squares - compensation * compensation / n) / (n - 1.0)).sqrt()
}

/// Empirical-distribution quantile over ascending `sorted` values: the first
/// value whose cumulative count reaches `p * n`.
#[must_use]
pub fn empirical_quantile(p: f64, sorted: &[f64]) -> f64 {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    let target = p * sorted.len() as f64;
    let mut cumulative = 0.0;
    for value in sorted {
        cumulative += 1.0;
        if cumulative >= target {
            return *value;
        }
    }
    sorted[sorted.len() - 1]
}

/// Left-to-right sum; a NaN anywhere poisons the result. NaN when empty.
#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().copied().reduce(|acc, v| acc + v).unwrap_or(f64::NAN)
}

/// Product of all values, 1 for an empty slice.
#[must_use]
pub fn prod(values: &[f64]) -> f64 {
    values.iter().product()
}

#[must_use]
pub fn cum_prod(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(1.0, |acc, v| {
            *acc *= v;
            Some(*acc)
        })
        .collect()
}

#[must_use]
pub fn add_const(c: f64, values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v + c).collect()
}

pub fn elementwise(left: &[f64], right: &[f64], op: ArithmeticOp) -> Result<Vec<f64>, ColumnError> {
    if left.len() != right.len() {
        return Err(ColumnError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left
        .iter()
        .zip(right)
        .map(|(lhs, rhs)| op.apply(*lhs, *rhs))
        .collect())
}

/// Weighted average `sum(v * w) / sum(w)` over equally long slices.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Result<f64, ColumnError> {
    if values.len() != weights.len() {
        return Err(ColumnError::LengthMismatch {
            left: values.len(),
            right: weights.len(),
        });
    }
    if values.is_empty() {
        return Ok(f64::NAN);
    }
    let (weighted, total) = values
        .iter()
        .zip(weights)
        .fold((0.0, 0.0), |(acc, total), (v, w)| (acc + v * w, total + w));
    Ok(weighted / total)
}

#[cfg(test)]
mod tests {
    use super::{
        add_const, cum_prod, elementwise, empirical_quantile, mean, prod, sample_std_dev, sum,
        weighted_mean,
    };
    use crate::{ArithmeticOp, ColumnError};

    #[test]
    fn std_dev_is_bessel_corrected() {
        let sd = sample_std_dev(&[0.0, 1.0]);
        assert!((sd - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!(sample_std_dev(&[3.0]).is_nan());
        assert!(sample_std_dev(&[]).is_nan());
    }

    #[test]
    fn empirical_quantile_picks_first_value_reaching_rank() {
        let sorted = [-64.0, 13.0, 101.0];
        assert_eq!(empirical_quantile(0.8, &sorted), 101.0);
        assert_eq!(empirical_quantile(0.5, &sorted), 13.0);
        assert_eq!(empirical_quantile(0.0, &sorted), -64.0);
        assert!(empirical_quantile(1.5, &sorted).is_nan());
    }

    #[test]
    fn folds_propagate_nan() {
        assert!(sum(&[1.0, f64::NAN, 2.0]).is_nan());
        assert!(sum(&[]).is_nan());
        assert_eq!(prod(&[]), 1.0);
        assert!(mean(&[1.0, f64::NAN]).is_nan());
        assert_eq!(cum_prod(&[1.0, 2.0, 3.0]), vec![1.0, 2.0, 6.0]);
        assert_eq!(add_const(1.0, &[1.0, 2.0]), vec![2.0, 3.0]);
    }

    #[test]
    fn elementwise_requires_equal_lengths() {
        let out = elementwise(&[1.0, 2.0], &[3.0, 4.0], ArithmeticOp::Mul).expect("mul");
        assert_eq!(out, vec![3.0, 8.0]);
        let err = elementwise(&[1.0], &[1.0, 2.0], ArithmeticOp::Add).expect_err("mismatch");
        assert_eq!(err, ColumnError::LengthMismatch { left: 1, right: 2 });
    }

    #[test]
    fn weighted_mean_normalizes_by_weight_total() {
        let out = weighted_mean(&[23.0, 13.0], &[3.0, 2.0]).expect("weights");
        assert_eq!(out, 19.0);
    }
}
