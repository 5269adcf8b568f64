//! Confusion matrix and per-class classification metrics.

use std::fmt;

use crate::error::RfError;

/// Largest class count [`ConfusionMatrix::from_labels`] will allocate.
pub const MAX_CLASSES: usize = 1024;

/// A confusion matrix for multi-class classification.
///
/// Entry `matrix[true_class][predicted_class]` counts how many samples
/// with true label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
    class_names: Option<Vec<String>>,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassMetrics {
    /// The class label.
    pub class: usize,
    /// Precision: TP / (TP + FP). 0.0 if no predictions for this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true samples for this class.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// The matrix covers labels `0..n` where `n` is the larger of
    /// `min_classes` and one past the largest label seen.
    ///
    /// # Errors
    ///
    /// | Variant                         | Condition                      |
    /// |---------------------------------|--------------------------------|
    /// | [`RfError::EmptyDataset`]       | zero labels provided           |
    /// | [`RfError::LabelCountMismatch`] | the two slices differ in length |
    /// | [`RfError::TooManyClasses`]     | more than [`MAX_CLASSES`] classes needed |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        min_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if predicted.len() != true_labels.len() {
            return Err(RfError::LabelCountMismatch {
                samples: true_labels.len(),
                labels: predicted.len(),
            });
        }

        let max_label = true_labels
            .iter()
            .chain(predicted)
            .copied()
            .max()
            .unwrap_or_default();
        let n_classes = min_classes.max(max_label.saturating_add(1));
        if n_classes > MAX_CLASSES {
            return Err(RfError::TooManyClasses {
                requested: n_classes,
                max_classes: MAX_CLASSES,
            });
        }

        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in true_labels.iter().zip(predicted) {
            matrix[t][p] += 1;
        }
        Ok(Self {
            matrix,
            n_classes,
            class_names: None,
        })
    }

    /// Attach display names for the classes, indexed by label.
    ///
    /// Labels without a name fall back to their number.
    #[must_use]
    pub fn with_class_names(mut self, names: &[&str]) -> Self {
        self.class_names = Some(names.iter().map(|n| (*n).to_string()).collect());
        self
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted_c: usize = (0..self.n_classes).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = if predicted_c == 0 {
                    0.0
                } else {
                    tp as f64 / predicted_c as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flat_map(|row| row.iter()).sum()
    }

    fn class_name(&self, class: usize) -> String {
        self.class_names
            .as_ref()
            .and_then(|names| names.get(class).cloned())
            .unwrap_or_else(|| class.to_string())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = (0..self.n_classes).map(|c| self.class_name(c)).collect();
        let width = names.iter().map(String::len).max().unwrap_or(1).max(7) + 5;

        write!(f, "{:>width$}", "")?;
        for name in &names {
            write!(f, " {:>width$}", format!("pred_{name}"))?;
        }
        writeln!(f)?;

        for (name, row) in names.iter().zip(&self.matrix) {
            write!(f, "{:>width$}", format!("true_{name}"))?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let true_labels = vec![0, 0, 1, 1, 2, 2];
        let predicted = vec![0, 0, 1, 1, 2, 2];
        let cm = ConfusionMatrix::from_labels(&true_labels, &predicted, 0).unwrap();
        assert_eq!(cm.n_classes(), 3);
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);

        for m in cm.class_metrics() {
            assert!((m.precision - 1.0).abs() < f64::EPSILON);
            assert!((m.recall - 1.0).abs() < f64::EPSILON);
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn oversized_label_is_rejected() {
        let err = ConfusionMatrix::from_labels(&[0, 1], &[usize::MAX, 1], 2).unwrap_err();
        assert!(matches!(
            err,
            RfError::TooManyClasses { requested: usize::MAX, max_classes: MAX_CLASSES }
        ));

        let err = ConfusionMatrix::from_labels(&[MAX_CLASSES], &[0], 2).unwrap_err();
        assert!(matches!(err, RfError::TooManyClasses { requested, .. } if requested == MAX_CLASSES + 1));
    }

    #[test]
    fn largest_supported_label_fits() {
        let cm = ConfusionMatrix::from_labels(&[MAX_CLASSES - 1], &[0], 2).unwrap();
        assert_eq!(cm.n_classes(), MAX_CLASSES);
    }

    #[test]
    fn known_binary_matrix() {
        // True: [0,0,0,0, 1,1,1,1,1,1]
        // Pred: [0,0,0,1, 1,1,1,1,0,0]
        let true_labels = vec![0, 0, 0, 0, 1, 1, 1, 1, 1, 1];
        let predicted = vec![0, 0, 0, 1, 1, 1, 1, 1, 0, 0];
        let cm = ConfusionMatrix::from_labels(&true_labels, &predicted, 2).unwrap();

        assert_eq!(cm.as_rows(), &[vec![3, 1], vec![2, 4]]);
        let metrics = cm.class_metrics();
        // Class 1: TP=4, FP=1, FN=2
        assert!((metrics[1].precision - 0.8).abs() < 1e-10);
        assert!((metrics[1].recall - 4.0 / 6.0).abs() < 1e-10);
        assert_eq!(metrics[1].support, 6);
        assert!((cm.accuracy() - 0.7).abs() < 1e-10);
        assert_eq!(cm.total(), 10);
    }

    #[test]
    fn empty_labels_error() {
        let err = ConfusionMatrix::from_labels(&[], &[], 2).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn length_mismatch_error() {
        let err = ConfusionMatrix::from_labels(&[0, 1], &[0], 2).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { samples: 2, labels: 1 }));
    }

    #[test]
    fn min_classes_pads_unseen_class() {
        let cm = ConfusionMatrix::from_labels(&[0, 0], &[0, 0], 2).unwrap();
        assert_eq!(cm.n_classes(), 2);
        let metrics = cm.class_metrics();
        assert_eq!(metrics[1].support, 0);
        assert_eq!(metrics[1].f1, 0.0);
    }

    #[test]
    fn display_uses_class_names() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2)
            .unwrap()
            .with_class_names(&["Rejected", "Approved"]);
        let output = format!("{cm}");
        assert!(output.contains("pred_Approved"));
        assert!(output.contains("true_Rejected"));
    }

    #[test]
    fn display_falls_back_to_numbers() {
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 1], 2).unwrap();
        let output = format!("{cm}");
        assert!(output.contains("pred_0"));
        assert!(output.contains("true_1"));
    }
}
