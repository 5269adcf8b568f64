//! Model serialization and deserialization via bincode.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Origin label used in errors for in-memory buffers.
const BYTES_ORIGIN: &str = "<bytes>";

/// Versioned envelope for the serialized model.
///
/// Generic over the forest field so saving can borrow while loading owns.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope<F> {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Number of trees in the forest.
    n_trees: usize,
    /// Number of features the model was trained on.
    n_features: usize,
    /// The serialized forest.
    forest: F,
}

/// Only the version field, decoded ahead of the full envelope.
#[derive(serde::Deserialize)]
struct VersionProbe {
    format_version: u32,
}

fn decode(bytes: &[u8], origin: &str) -> Result<RandomForest, RfError> {
    let probe: VersionProbe =
        bincode::deserialize(bytes).map_err(|e| RfError::DeserializeModel {
            origin: origin.to_string(),
            source: e,
        })?;
    if probe.format_version != FORMAT_VERSION {
        return Err(RfError::IncompatibleModelVersion {
            expected: FORMAT_VERSION,
            found: probe.format_version,
            origin: origin.to_string(),
        });
    }

    let envelope: ModelEnvelope<RandomForest> =
        bincode::deserialize(bytes).map_err(|e| RfError::DeserializeModel {
            origin: origin.to_string(),
            source: e,
        })?;
    check_structure(&envelope).map_err(|reason| RfError::InvalidModel {
        origin: origin.to_string(),
        reason,
    })?;

    debug!(
        n_trees = envelope.n_trees,
        n_features = envelope.n_features,
        "model decoded"
    );
    Ok(envelope.forest)
}

/// Reject envelopes whose forest could index outside its own rows.
fn check_structure(envelope: &ModelEnvelope<RandomForest>) -> Result<(), String> {
    let forest = &envelope.forest;
    if envelope.n_trees != forest.trees.len() {
        return Err(format!(
            "header declares {} trees, forest has {}",
            envelope.n_trees,
            forest.trees.len()
        ));
    }
    if envelope.n_features != forest.n_features {
        return Err(format!(
            "header declares {} features, forest has {}",
            envelope.n_features, forest.n_features
        ));
    }
    for (tree_index, tree) in forest.trees.iter().enumerate() {
        let Some(root) = tree.root() else {
            return Err(format!("tree {tree_index} is not fitted"));
        };
        if tree.n_features() != forest.n_features {
            return Err(format!(
                "tree {tree_index} has {} features, forest has {}",
                tree.n_features(),
                forest.n_features
            ));
        }
        if let Some(feature) = root.max_feature_index()
            && feature >= forest.n_features
        {
            return Err(format!(
                "tree {tree_index} splits on feature {feature}, forest has {}",
                forest.n_features
            ));
        }
    }
    Ok(())
}

impl RandomForest {
    /// Encode the fitted model as bytes.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::NotFitted`] | the forest has no trees |
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    pub fn to_bytes(&self) -> Result<Vec<u8>, RfError> {
        if !self.is_fitted() {
            return Err(RfError::NotFitted);
        }
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_trees: self.trees.len(),
            n_features: self.n_features,
            forest: self,
        };
        bincode::serialize(&envelope).map_err(|e| RfError::SerializeModel { source: e })
    }

    /// Decode a model produced by [`RandomForest::to_bytes`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::DeserializeModel`] | bincode decoding failed |
    /// | [`RfError::InvalidModel`] | decoded trees disagree with the header or feature width |
    /// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RfError> {
        decode(bytes, BYTES_ORIGIN)
    }

    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::NotFitted`] | the forest has no trees |
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    /// | [`RfError::WriteModel`] | file write failed |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        std::fs::write(path, &bytes).map_err(|e| RfError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = self.trees.len(),
            "model saved"
        );
        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ReadModel`] | file read failed |
    /// | [`RfError::DeserializeModel`] | bincode decoding failed |
    /// | [`RfError::InvalidModel`] | decoded trees disagree with the header or feature width |
    /// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| RfError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let forest = decode(&bytes, &path.display().to_string())?;
        info!(n_trees = forest.n_trees(), "model loaded");
        Ok(forest)
    }
}
