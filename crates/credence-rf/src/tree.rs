use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    impurity::{information_gain, split},
    node::{FeatureIndex, TreeNode},
    vote::majority_label,
};

/// Configuration for a single decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default               |
/// |----------------|-----------------------|
/// | `max_depth`    | `None` (unlimited)    |
/// | `max_features` | `None` (all features) |
/// | `seed`         | 42                    |
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTreeConfig {
    pub(crate) max_depth: Option<usize>,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: None,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until every leaf is pure or no split separates the rows.
    /// `Some(d)` turns every node at depth `d` into a leaf (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the number of features sampled at each node.
    ///
    /// `None` evaluates every feature at every node.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the seed of the per-node feature sampler.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the per-node feature sample size, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a training batch and return its feature width.
pub(crate) fn check_training_batch(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<usize, RfError> {
    if features.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            samples: features.len(),
            labels: labels.len(),
        });
    }

    let n_features = features[0].len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(n_features)
}

/// Validate an inference batch against the training width.
pub(crate) fn check_inference_batch(features: &[Vec<f64>], expected: usize) -> Result<(), RfError> {
    match features.iter().find(|row| row.len() != expected) {
        Some(row) => Err(RfError::SchemaMismatch {
            expected,
            got: row.len(),
        }),
        None => Ok(()),
    }
}

/// A decision tree classifier grown by exhaustive Gini-gain search.
///
/// Created unfitted by [`DecisionTree::new`]; [`DecisionTree::fit`] grows the
/// tree and [`DecisionTree::predict`] descends it once per row.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    config: DecisionTreeConfig,
    root: Option<TreeNode>,
    n_features: usize,
}

impl DecisionTree {
    /// Create an unfitted tree.
    #[must_use]
    pub fn new(config: DecisionTreeConfig) -> Self {
        Self {
            config,
            root: None,
            n_features: 0,
        }
    }

    /// Grow the tree on a row-major training batch.
    ///
    /// `features[sample_idx][feature_idx]`, `labels[sample_idx]`. A failed
    /// call leaves the tree as it was.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                            |
    /// |-----------------------------------|-------------------------------------------------|
    /// | [`RfError::EmptyDataset`]         | `features` is empty                             |
    /// | [`RfError::LabelCountMismatch`]   | `labels.len() != features.len()`                |
    /// | [`RfError::ZeroFeatures`]         | rows have zero feature columns                  |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths                  |
    /// | [`RfError::NonFiniteValue`]       | any value is NaN or infinite                    |
    /// | [`RfError::InvalidMaxDepth`]      | `max_depth` is `Some(0)`                        |
    /// | [`RfError::InvalidMaxFeatures`]   | `max_features` is outside `[1, n_features]`     |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), RfError> {
        let n_features = check_training_batch(features, labels)?;

        if self.config.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if let Some(max_features) = self.config.max_features {
            if max_features == 0 || max_features > n_features {
                return Err(RfError::InvalidMaxFeatures {
                    max_features,
                    n_features,
                });
            }
        }

        let rows: Vec<&[f64]> = features.iter().map(Vec::as_slice).collect();
        let mut grower = Grower {
            max_depth: self.config.max_depth,
            max_features: self.config.max_features,
            n_features,
            rng: ChaCha8Rng::seed_from_u64(self.config.seed),
        };
        let root = grower.grow(&rows, labels, 0);

        debug!(
            n_features,
            n_nodes = root.n_nodes(),
            depth = root.depth(),
            "decision tree built"
        );

        self.root = Some(root);
        self.n_features = n_features;
        Ok(())
    }

    /// Predict one label per input row.
    ///
    /// # Errors
    ///
    /// | Variant                     | When                                        |
    /// |-----------------------------|---------------------------------------------|
    /// | [`RfError::NotFitted`]      | called before a successful `fit`            |
    /// | [`RfError::SchemaMismatch`] | a row's width differs from the training one |
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        let root = self.root.as_ref().ok_or(RfError::NotFitted)?;
        check_inference_batch(features, self.n_features)?;
        Ok(features.iter().map(|row| root.predict_row(row)).collect())
    }

    /// Predict the label of a single row.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionTree::predict`].
    pub fn predict_row(&self, row: &[f64]) -> Result<usize, RfError> {
        let root = self.root.as_ref().ok_or(RfError::NotFitted)?;
        if row.len() != self.n_features {
            return Err(RfError::SchemaMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        Ok(root.predict_row(row))
    }

    /// Return `true` once the tree has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Borrow the root node, if fitted.
    #[must_use]
    pub fn root(&self) -> Option<&TreeNode> {
        self.root.as_ref()
    }

    /// Borrow the configuration.
    #[must_use]
    pub fn config(&self) -> &DecisionTreeConfig {
        &self.config
    }

    /// Return the training feature width (0 when unfitted).
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes (0 when unfitted).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::n_nodes)
    }

    /// Return the number of leaves (0 when unfitted).
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::n_leaves)
    }

    /// Return the depth of the tree; a single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, TreeNode::depth)
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.0.
    ///
    /// All zeros when the tree is a single leaf or unfitted.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        if let Some(root) = &self.root {
            root.accumulate_gain(&mut totals);
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }
}

/// The winning candidate at a node.
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Recursive growth state shared by every node of one `fit` call.
struct Grower {
    max_depth: Option<usize>,
    max_features: Option<usize>,
    n_features: usize,
    rng: ChaCha8Rng,
}

impl Grower {
    fn grow(&mut self, rows: &[&[f64]], labels: &[usize], depth: usize) -> TreeNode {
        // Rows are never empty here: the root batch is validated and every
        // accepted split has two non-empty sides.
        let majority = majority_label(labels.iter().copied()).unwrap_or_default();

        let pure = labels.iter().all(|&l| l == labels[0]);
        let depth_reached = self.max_depth.is_some_and(|max_d| depth >= max_d);
        if pure || depth_reached {
            return TreeNode::Leaf { label: majority };
        }

        let Some(best) = self.best_split(rows, labels) else {
            return TreeNode::Leaf { label: majority };
        };

        let (left_rows, left_labels) = gather(rows, labels, &best.left);
        let (right_rows, right_labels) = gather(rows, labels, &best.right);

        let left = self.grow(&left_rows, &left_labels, depth + 1);
        let right = self.grow(&right_rows, &right_labels, depth + 1);

        TreeNode::Split {
            feature: FeatureIndex::new(best.feature),
            threshold: best.threshold,
            gain: best.gain,
            n_samples: rows.len(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Search every candidate feature and every distinct observed value.
    ///
    /// Features are visited in ascending index order and thresholds in
    /// ascending value order; only a strictly greater gain replaces the
    /// current best, so the first of several equal-gain splits wins. Splits
    /// with an empty side are not candidates.
    fn best_split(&mut self, rows: &[&[f64]], labels: &[usize]) -> Option<Candidate> {
        let mut best_gain = -1.0f64;
        let mut best: Option<Candidate> = None;

        for feature in self.candidate_features() {
            let mut thresholds: Vec<f64> = rows.iter().map(|row| row[feature]).collect();
            thresholds.sort_unstable_by(f64::total_cmp);
            thresholds.dedup();

            for threshold in thresholds {
                let (left, right) = split(rows, feature, threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }
                let gain = information_gain(labels, &left, &right);
                if gain > best_gain {
                    best_gain = gain;
                    best = Some(Candidate {
                        feature,
                        threshold,
                        gain,
                        left,
                        right,
                    });
                }
            }
        }
        best
    }

    /// Feature indices to evaluate at the current node, ascending.
    fn candidate_features(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.n_features).collect();
        let Some(take) = self.max_features else {
            return order;
        };
        // Partial Fisher-Yates over the first `take` positions.
        let take = take.min(self.n_features);
        for i in 0..take {
            let j = self.rng.gen_range(i..self.n_features);
            order.swap(i, j);
        }
        order.truncate(take);
        order.sort_unstable();
        order
    }
}

fn gather<'a>(
    rows: &[&'a [f64]],
    labels: &[usize],
    indices: &[usize],
) -> (Vec<&'a [f64]>, Vec<usize>) {
    indices.iter().map(|&i| (rows[i], labels[i])).unzip()
}
