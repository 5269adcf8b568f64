//! Domain types for credence-io.

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An encoded loan-approval training set.
///
/// Produced by [`LoanDatasetReader`](crate::LoanDatasetReader). Rows follow
/// the shared feature schema; `labels[i]` is the outcome of `features[i]`
/// (`1` approved, `0` rejected).
#[derive(Debug)]
pub struct LoanDataset {
    /// Feature column names, in vector order.
    feature_names: Vec<String>,
    /// Feature values: `features[sample_index][feature_index]`.
    features: Vec<Vec<f64>>,
    /// Outcome labels, parallel to `features`.
    labels: Vec<usize>,
}

impl LoanDataset {
    /// Create a new loan dataset.
    pub(crate) fn new(feature_names: Vec<String>, features: Vec<Vec<f64>>, labels: Vec<usize>) -> Self {
        Self {
            feature_names,
            features,
            labels,
        }
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the outcome labels.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return the number of approved samples.
    #[must_use]
    pub fn n_approved(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_experiment_names() {
        assert!(ExperimentName::new("test".into()).is_ok());
        assert!(ExperimentName::new("my-experiment_01".into()).is_ok());
        assert!(ExperimentName::new("ABC".into()).is_ok());
    }

    #[test]
    fn invalid_experiment_names() {
        assert!(ExperimentName::new(String::new()).is_err());
        assert!(ExperimentName::new("has space".into()).is_err());
        assert!(ExperimentName::new("has/slash".into()).is_err());
        assert!(ExperimentName::new("dot.name".into()).is_err());
    }

    #[test]
    fn dataset_counts() {
        let ds = LoanDataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]],
            vec![1, 0, 1],
        );
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.n_approved(), 2);
    }
}
