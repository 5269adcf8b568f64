use std::fmt;
use std::path::PathBuf;

/// Coarse classification of an [`RfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The training or inference batch is malformed.
    InvalidInput,
    /// A configuration value is out of range.
    InvalidConfig,
    /// A model was used before a successful `fit`.
    NotFitted,
    /// An inference row does not match the training width.
    SchemaMismatch,
    /// Reading, writing, or decoding a model artifact failed.
    Persistence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::InvalidConfig => "invalid config",
            ErrorKind::NotFitted => "not fitted",
            ErrorKind::SchemaMismatch => "schema mismatch",
            ErrorKind::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// Errors from decision tree and random forest operations.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_estimators is zero.
    #[error("n_estimators must be at least 1, got {n_estimators}")]
    InvalidTreeCount {
        /// The invalid n_estimators value provided.
        n_estimators: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when max_features resolves to 0 or exceeds n_features.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved max_features value.
        max_features: usize,
        /// The number of features in the dataset.
        n_features: usize,
    },

    /// Returned when a train/test split fraction is not in (0.0, 1.0).
    #[error("test_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTestFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than the first one.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the label set is not parallel to the feature batch.
    #[error("got {labels} labels for {samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        samples: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Returned when a split would leave the training or test side empty.
    #[error("need at least {required} samples to split, got {n_samples}")]
    TooFewSamples {
        /// Number of samples available.
        n_samples: usize,
        /// Minimum number of samples the operation needs.
        required: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when evaluation labels would need more classes than a
    /// confusion matrix holds.
    #[error("labels require {requested} classes, at most {max_classes} supported")]
    TooManyClasses {
        /// One past the largest label seen, or the requested minimum.
        requested: usize,
        /// The supported class count.
        max_classes: usize,
    },

    /// Returned when predicting or persisting a model that has not been fitted.
    #[error("model has not been fitted")]
    NotFitted,

    /// Returned when an inference row has a different width than the training rows.
    #[error("prediction input has {got} features, expected {expected}")]
    SchemaMismatch {
        /// The number of features the model was trained on.
        expected: usize,
        /// The number of features in the prediction input.
        got: usize,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {origin}")]
    DeserializeModel {
        /// Where the bytes came from (a file path, or `<bytes>`).
        origin: String,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a decoded model is internally inconsistent.
    #[error("invalid model in {origin}: {reason}")]
    InvalidModel {
        /// Where the bytes came from (a file path, or `<bytes>`).
        origin: String,
        /// Which consistency check failed.
        reason: String,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {origin}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the artifact.
        found: u32,
        /// Where the bytes came from (a file path, or `<bytes>`).
        origin: String,
    },
}

impl RfError {
    /// Return the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RfError::EmptyDataset
            | RfError::ZeroFeatures
            | RfError::FeatureCountMismatch { .. }
            | RfError::LabelCountMismatch { .. }
            | RfError::TooFewSamples { .. }
            | RfError::TooManyClasses { .. }
            | RfError::NonFiniteValue { .. } => ErrorKind::InvalidInput,
            RfError::InvalidTreeCount { .. }
            | RfError::InvalidMaxDepth { .. }
            | RfError::InvalidMaxFeatures { .. }
            | RfError::InvalidTestFraction { .. } => ErrorKind::InvalidConfig,
            RfError::NotFitted => ErrorKind::NotFitted,
            RfError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            RfError::SerializeModel { .. }
            | RfError::DeserializeModel { .. }
            | RfError::WriteModel { .. }
            | RfError::ReadModel { .. }
            | RfError::InvalidModel { .. }
            | RfError::IncompatibleModelVersion { .. } => ErrorKind::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(RfError::EmptyDataset.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            RfError::LabelCountMismatch { samples: 3, labels: 2 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            RfError::InvalidTreeCount { n_estimators: 0 }.kind(),
            ErrorKind::InvalidConfig
        );
        assert_eq!(RfError::NotFitted.kind(), ErrorKind::NotFitted);
        assert_eq!(
            RfError::SchemaMismatch { expected: 10, got: 9 }.kind(),
            ErrorKind::SchemaMismatch
        );
        assert_eq!(
            RfError::TooManyClasses { requested: 5000, max_classes: 1024 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            RfError::InvalidModel { origin: "<bytes>".into(), reason: "x".into() }.kind(),
            ErrorKind::Persistence
        );
    }

    #[test]
    fn messages_carry_fields() {
        let err = RfError::SchemaMismatch { expected: 10, got: 3 };
        assert_eq!(err.to_string(), "prediction input has 3 features, expected 10");
    }
}
