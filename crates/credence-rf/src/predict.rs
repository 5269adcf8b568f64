//! Prediction methods for the Random Forest ensemble.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::forest::RandomForest;
use crate::tree::{DecisionTree, check_inference_batch};
use crate::vote::majority_label;

impl RandomForest {
    /// Predict one label per input row by majority vote across trees.
    ///
    /// Rows are scored in parallel; output order matches input order. Vote
    /// ties go to the label voted first in tree order.
    ///
    /// # Errors
    ///
    /// | Variant                     | When                                        |
    /// |-----------------------------|---------------------------------------------|
    /// | [`RfError::NotFitted`]      | called before a successful `fit`            |
    /// | [`RfError::SchemaMismatch`] | a row's width differs from the training one |
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        if self.trees.is_empty() {
            return Err(RfError::NotFitted);
        }
        check_inference_batch(features, self.n_features)?;

        features
            .par_iter()
            .map(|row| self.vote(row))
            .collect()
    }

    /// Predict the label of a single row.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::predict`].
    pub fn predict_row(&self, row: &[f64]) -> Result<usize, RfError> {
        if self.trees.is_empty() {
            return Err(RfError::NotFitted);
        }
        if row.len() != self.n_features {
            return Err(RfError::SchemaMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        self.vote(row)
    }

    fn vote(&self, row: &[f64]) -> Result<usize, RfError> {
        let votes = self
            .trees
            .iter()
            .map(|tree| tree.predict_row(row))
            .collect::<Result<Vec<usize>, RfError>>()?;
        majority_label(votes).ok_or(RfError::NotFitted)
    }

    /// Return `true` once the forest has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Return the number of features this forest was trained on (0 when unfitted).
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble (0 when unfitted).
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Borrow the fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Borrow the configuration.
    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }
}
