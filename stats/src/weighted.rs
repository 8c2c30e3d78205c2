//! Weighted descriptive statistics
//!
//! Continuous variables get a weighted mean and a Bessel-corrected weighted
//! standard deviation. Categorical variables get weighted percentage shares.
//! Absent entries are dropped together with their weights before anything is
//! summed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::{Result, StatsError};

/// Mean, standard deviation and valid N for one continuous variable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedSummary {
    pub mean: f64,
    /// `None` when fewer than two valid observations exist
    pub standard_deviation: Option<f64>,
    pub valid_count: usize,
}

/// Denominator used for weighted percentage shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareBase {
    /// Total weight of rows where the variable is present
    #[default]
    ValidResponses,
    /// Total weight of every row, including rows missing the variable
    AllRespondents,
}

/// Weighted percentage per category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary<K: Ord> {
    pub shares: BTreeMap<K, f64>,
    pub valid_count: usize,
}

impl<K: Ord> CategoricalSummary<K> {
    /// Percentage for `category`, 0 when no weight fell into it
    pub fn share(&self, category: &K) -> f64 {
        self.shares.get(category).copied().unwrap_or(0.0)
    }
}

fn check_lengths<T>(values: &[Option<T>], weights: &[f64]) -> Result<()> {
    if values.len() != weights.len() {
        return Err(StatsError::LengthMismatch {
            values: values.len(),
            weights: weights.len(),
        });
    }
    Ok(())
}

/// Weighted mean, standard deviation and valid count of `values`.
///
/// The standard deviation applies `n / (n - 1)` to the weighted population
/// variance. Fails with `DivisionByZero` when the valid weights sum to zero.
pub fn weighted_summary(values: &[Option<f64>], weights: &[f64]) -> Result<WeightedSummary> {
    check_lengths(values, weights)?;

    let valid: Vec<(f64, f64)> = values
        .iter()
        .zip(weights)
        .filter_map(|(value, weight)| value.map(|x| (x, *weight)))
        .collect();
    let n = valid.len();

    let weight_sum: f64 = valid.iter().map(|(_, w)| w).sum();
    if weight_sum == 0.0 {
        return Err(StatsError::DivisionByZero { valid_count: n });
    }

    let mean = valid.iter().map(|(x, w)| w * x).sum::<f64>() / weight_sum;
    let variance = valid
        .iter()
        .map(|(x, w)| w * (x - mean).powi(2))
        .sum::<f64>()
        / weight_sum;

    let standard_deviation = if n > 1 {
        Some((variance * n as f64 / (n - 1) as f64).sqrt())
    } else {
        None
    };

    Ok(WeightedSummary {
        mean,
        standard_deviation,
        valid_count: n,
    })
}

fn share_denominator<K>(values: &[Option<K>], weights: &[f64], base: ShareBase) -> Result<f64> {
    let total: f64 = match base {
        ShareBase::ValidResponses => values
            .iter()
            .zip(weights)
            .filter(|(value, _)| value.is_some())
            .map(|(_, w)| w)
            .sum(),
        ShareBase::AllRespondents => weights.iter().sum(),
    };
    if total == 0.0 {
        return Err(StatsError::DivisionByZero {
            valid_count: values.iter().filter(|v| v.is_some()).count(),
        });
    }
    Ok(total)
}

/// Weighted percentage of each category of `values`.
pub fn weighted_distribution<K: Ord + Copy>(
    values: &[Option<K>],
    weights: &[f64],
    base: ShareBase,
) -> Result<CategoricalSummary<K>> {
    check_lengths(values, weights)?;
    let total = share_denominator(values, weights, base)?;

    let mut group_weights: BTreeMap<K, f64> = BTreeMap::new();
    let mut valid_count = 0;
    for (value, weight) in values.iter().zip(weights) {
        if let Some(category) = value {
            *group_weights.entry(*category).or_insert(0.0) += weight;
            valid_count += 1;
        }
    }

    let shares = group_weights
        .into_iter()
        .map(|(category, weight)| (category, 100.0 * weight / total))
        .collect();

    Ok(CategoricalSummary {
        shares,
        valid_count,
    })
}

/// Weighted percentage of valid entries satisfying `predicate`.
pub fn weighted_share<K, P>(
    values: &[Option<K>],
    weights: &[f64],
    predicate: P,
    base: ShareBase,
) -> Result<f64>
where
    P: Fn(&K) -> bool,
{
    check_lengths(values, weights)?;
    let total = share_denominator(values, weights, base)?;

    let matched: f64 = values
        .iter()
        .zip(weights)
        .filter(|(value, _)| value.as_ref().is_some_and(&predicate))
        .map(|(_, w)| w)
        .sum();

    Ok(100.0 * matched / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn worked_example_mean_and_sd() {
        let values = [Some(1.0), Some(2.0), Some(3.0)];
        let weights = [1.0, 1.0, 2.0];

        let summary = weighted_summary(&values, &weights).expect("summary");

        assert!(approx(summary.mean, 2.25));
        // population variance = (1.5625 + 0.0625 + 2*0.5625) / 4 = 0.6875
        let expected_sd = (0.6875_f64 * 3.0 / 2.0).sqrt();
        assert!(approx(
            summary.standard_deviation.expect("sd defined for n=3"),
            expected_sd
        ));
        assert_eq!(summary.valid_count, 3);
    }

    #[test]
    fn absent_entries_are_dropped_with_their_weights() {
        let values = [Some(4.0), None, Some(8.0), None];
        let weights = [1.0, 100.0, 1.0, 100.0];

        let summary = weighted_summary(&values, &weights).expect("summary");

        assert!(approx(summary.mean, 6.0));
        assert_eq!(summary.valid_count, 2);
    }

    #[test]
    fn mean_is_invariant_under_weight_scaling() {
        let values = [Some(3.0), Some(7.5), None, Some(-2.0), Some(10.0)];
        let weights = [0.4, 1.7, 3.0, 0.9, 2.2];

        let base = weighted_summary(&values, &weights).expect("summary");
        for k in [0.001, 0.5, 3.0, 1e6] {
            let scaled: Vec<f64> = weights.iter().map(|w| w * k).collect();
            let summary = weighted_summary(&values, &scaled).expect("scaled summary");
            assert!(
                (summary.mean - base.mean).abs() < 1e-9 * base.mean.abs().max(1.0),
                "mean changed under scale {k}"
            );
            assert_eq!(summary.valid_count, base.valid_count);
        }
    }

    #[test]
    fn sd_not_computable_for_single_observation() {
        let summary = weighted_summary(&[None, Some(5.0)], &[1.0, 2.0]).expect("summary");
        assert_eq!(summary.standard_deviation, None);
        assert_eq!(summary.valid_count, 1);
        assert!(approx(summary.mean, 5.0));
    }

    #[test]
    fn zero_valid_weight_is_division_by_zero() {
        let err = weighted_summary(&[Some(1.0), Some(2.0), None], &[0.0, 0.0, 5.0])
            .expect_err("zero weight must fail");
        assert!(matches!(err, StatsError::DivisionByZero { valid_count: 2 }));
    }

    #[test]
    fn all_absent_is_division_by_zero() {
        let err = weighted_summary(&[None, None], &[1.0, 1.0]).expect_err("no valid data");
        assert!(matches!(err, StatsError::DivisionByZero { valid_count: 0 }));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = weighted_summary(&[Some(1.0)], &[1.0, 2.0]).expect_err("length mismatch");
        assert!(matches!(
            err,
            StatsError::LengthMismatch {
                values: 1,
                weights: 2
            }
        ));
    }

    #[test]
    fn distribution_over_valid_responses() {
        let values = [Some(1), Some(2), Some(2), None, Some(3)];
        let weights = [1.0, 1.0, 2.0, 4.0, 4.0];

        let dist =
            weighted_distribution(&values, &weights, ShareBase::ValidResponses).expect("dist");

        assert_eq!(dist.valid_count, 4);
        assert!(approx(dist.share(&1), 12.5));
        assert!(approx(dist.share(&2), 37.5));
        assert!(approx(dist.share(&3), 50.0));
        assert!(approx(dist.shares.values().sum::<f64>(), 100.0));
    }

    #[test]
    fn distribution_over_all_respondents() {
        let values = [Some(1), Some(2), Some(2), None, Some(3)];
        let weights = [1.0, 1.0, 2.0, 4.0, 4.0];

        let dist =
            weighted_distribution(&values, &weights, ShareBase::AllRespondents).expect("dist");

        assert!(approx(dist.share(&1), 100.0 / 12.0));
        assert!(approx(dist.share(&3), 400.0 / 12.0));
        assert!(dist.shares.values().sum::<f64>() < 100.0);
    }

    #[test]
    fn missing_category_has_zero_share() {
        let dist = weighted_distribution(&[Some(1), Some(1)], &[1.0, 1.0], ShareBase::default())
            .expect("dist");
        assert_eq!(dist.share(&3), 0.0);
    }

    #[test]
    fn share_of_matching_entries() {
        let values = [Some(1), Some(2), None, Some(1)];
        let weights = [2.0, 1.0, 5.0, 1.0];

        let pct = weighted_share(&values, &weights, |v| *v == 1, ShareBase::ValidResponses)
            .expect("share");
        assert!(approx(pct, 75.0));

        let pct = weighted_share(&values, &weights, |v| *v == 1, ShareBase::AllRespondents)
            .expect("share");
        assert!(approx(pct, 100.0 * 3.0 / 9.0));
    }

    #[test]
    fn share_with_zero_total_weight_fails() {
        let err = weighted_share(&[None::<i64>, None], &[1.0, 1.0], |_| true, ShareBase::default())
            .expect_err("no valid data");
        assert!(matches!(err, StatsError::DivisionByZero { valid_count: 0 }));
    }
}
