//! Gini impurity, information gain, and threshold partitioning.
//!
//! These are pure functions over label slices and row-major feature rows.
//! The decision tree calls them for every candidate `(feature, threshold)`
//! pair at every node.

use crate::vote::tally;

/// Compute the Gini impurity `1 - Σ p_c²` of a label set.
///
/// A single-class set has impurity exactly `0.0`. The value is undefined for
/// an empty set; this implementation returns `0.0` for it.
#[must_use]
pub fn gini_impurity(labels: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let n = labels.len() as f64;
    let sum_sq: f64 = tally(labels.iter().copied())
        .iter()
        .map(|&(_, count)| {
            let p = count as f64 / n;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Compute the information gain of splitting `labels` into two index sets.
///
/// Returns the parent impurity minus the size-weighted mean of the child
/// impurities. `left_indices` and `right_indices` index into `labels` and are
/// expected to partition `0..labels.len()`; this is not checked.
#[must_use]
pub fn information_gain(labels: &[usize], left_indices: &[usize], right_indices: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let n = labels.len() as f64;
    let left: Vec<usize> = left_indices.iter().map(|&i| labels[i]).collect();
    let right: Vec<usize> = right_indices.iter().map(|&i| labels[i]).collect();

    let weighted = (left.len() as f64 / n) * gini_impurity(&left)
        + (right.len() as f64 / n) * gini_impurity(&right);
    gini_impurity(labels) - weighted
}

/// Partition row indices on `row[feature_index] <= threshold`.
///
/// Rows satisfying the condition go left, all others go right. Both index
/// vectors are in ascending row order.
#[must_use]
pub fn split<R: AsRef<[f64]>>(
    features: &[R],
    feature_index: usize,
    threshold: f64,
) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::with_capacity(features.len());
    let mut right = Vec::with_capacity(features.len());
    for (i, row) in features.iter().enumerate() {
        if row.as_ref()[feature_index] <= threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gini_pure_is_zero() {
        assert_eq!(gini_impurity(&[1, 1, 1, 1]), 0.0);
        assert_eq!(gini_impurity(&[7]), 0.0);
    }

    #[test]
    fn gini_binary_balanced() {
        assert!((gini_impurity(&[0, 1, 0, 1]) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_three_class_uniform() {
        let imp = gini_impurity(&[0, 1, 2, 0, 1, 2]);
        assert!((imp - (1.0 - 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn gini_within_bounds_for_k_classes() {
        let sets: [&[usize]; 5] = [
            &[0, 0, 0, 1],
            &[0, 1, 1, 1, 1, 1, 1],
            &[0, 1, 2, 2, 2],
            &[4, 4, 9, 9, 3],
            &[0, 1, 2, 3],
        ];
        for labels in sets {
            let k = tally(labels.iter().copied()).len() as f64;
            let imp = gini_impurity(labels);
            assert!(imp >= 0.0, "{labels:?} -> {imp}");
            assert!(imp <= 1.0 - 1.0 / k + 1e-12, "{labels:?} -> {imp}");
        }
    }

    #[test]
    fn perfect_split_recovers_parent_impurity() {
        let labels = [0, 0, 1, 1];
        let gain = information_gain(&labels, &[0, 1], &[2, 3]);
        assert!((gain - 0.5).abs() < 1e-12);
    }

    #[test]
    fn useless_split_has_zero_gain() {
        let labels = [0, 1, 0, 1];
        let gain = information_gain(&labels, &[0, 1], &[2, 3]);
        assert!(gain.abs() < 1e-12);
    }

    #[test]
    fn gain_is_never_negative_for_partitions() {
        let labels = [0, 1, 1, 0, 1, 0, 0, 1, 1];
        let n = labels.len();
        for cut in 1..n {
            let left: Vec<usize> = (0..cut).collect();
            let right: Vec<usize> = (cut..n).collect();
            let gain = information_gain(&labels, &left, &right);
            assert!(gain >= -1e-12, "cut {cut} -> {gain}");
        }
    }

    #[test]
    fn split_sends_equal_values_left() {
        let rows = vec![vec![1.0, 5.0], vec![2.0, 6.0], vec![3.0, 7.0]];
        let (left, right) = split(&rows, 0, 2.0);
        assert_eq!(left, vec![0, 1]);
        assert_eq!(right, vec![2]);
    }

    #[test]
    fn split_at_max_leaves_right_empty() {
        let rows = vec![vec![1.0], vec![4.0], vec![4.0]];
        let (left, right) = split(&rows, 0, 4.0);
        assert_eq!(left.len(), 3);
        assert!(right.is_empty());
    }
}
