//! Hold-out evaluation for Random Forest.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::forest::RandomForest;

/// A shuffled train/test partition of a labeled batch.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Training rows.
    pub train_features: Vec<Vec<f64>>,
    /// Training labels, parallel to `train_features`.
    pub train_labels: Vec<usize>,
    /// Held-out rows.
    pub test_features: Vec<Vec<f64>>,
    /// Held-out labels, parallel to `test_features`.
    pub test_labels: Vec<usize>,
}

/// Shuffle rows with a seeded generator and hold out `ceil(n * test_fraction)`.
///
/// # Errors
///
/// | Variant                          | Condition                                |
/// |----------------------------------|------------------------------------------|
/// | [`RfError::InvalidTestFraction`] | `test_fraction` is not in `(0.0, 1.0)`   |
/// | [`RfError::EmptyDataset`]        | zero samples                             |
/// | [`RfError::LabelCountMismatch`]  | `labels.len() != features.len()`         |
/// | [`RfError::TooFewSamples`]       | either side of the split would be empty  |
#[instrument(skip(features, labels), fields(n_samples = features.len()))]
pub fn train_test_split(
    features: &[Vec<f64>],
    labels: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, RfError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(RfError::InvalidTestFraction {
            fraction: test_fraction,
        });
    }
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            samples: features.len(),
            labels: labels.len(),
        });
    }

    let n_samples = features.len();
    let n_test = (n_samples as f64 * test_fraction).ceil() as usize;
    if n_test >= n_samples {
        return Err(RfError::TooFewSamples {
            n_samples,
            required: n_test + 1,
        });
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let (test_idx, train_idx) = order.split_at(n_test);
    let pick = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<usize>) {
        indices
            .iter()
            .map(|&i| (features[i].clone(), labels[i]))
            .unzip()
    };
    let (train_features, train_labels) = pick(train_idx);
    let (test_features, test_labels) = pick(test_idx);

    info!(n_train = train_labels.len(), n_test = test_labels.len(), "data split");

    Ok(TrainTestSplit {
        train_features,
        train_labels,
        test_features,
        test_labels,
    })
}

impl RandomForest {
    /// Predict `features` and tabulate the result against `labels`.
    ///
    /// The matrix always covers at least two classes.
    ///
    /// # Errors
    ///
    /// Any error from [`RandomForest::predict`] or
    /// [`ConfusionMatrix::from_labels`].
    pub fn evaluate(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<ConfusionMatrix, RfError> {
        let predictions = self.predict(features)?;
        let matrix = ConfusionMatrix::from_labels(labels, &predictions, 2)?;
        info!(
            n_samples = labels.len(),
            accuracy = matrix.accuracy(),
            "evaluation complete"
        );
        Ok(matrix)
    }
}
