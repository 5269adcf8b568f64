//! Random Forest classification: train, evaluate, predict.
//!
//! Provides a hand-rolled Random Forest classifier built from exhaustive
//! Gini-gain decision trees, bootstrap aggregation with parallel training via
//! rayon, majority-vote prediction, hold-out evaluation, feature importance,
//! versioned model serialization, and a swappable shared model handle.

mod config;
mod confusion;
mod error;
mod eval;
mod forest;
mod handle;
mod importance;
mod impurity;
mod node;
mod predict;
mod serialize;
mod tree;
mod vote;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix, MAX_CLASSES};
pub use error::{ErrorKind, RfError};
pub use eval::{TrainTestSplit, train_test_split};
pub use forest::RandomForest;
pub use handle::ModelHandle;
pub use importance::RankedFeature;
pub use impurity::{gini_impurity, information_gain, split};
pub use node::{FeatureIndex, TreeNode};
pub use serialize::FORMAT_VERSION;
pub use tree::{DecisionTree, DecisionTreeConfig};
pub use vote::majority_label;
