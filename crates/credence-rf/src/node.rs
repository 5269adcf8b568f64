use std::fmt;

/// Zero-based feature column index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in a fitted decision tree.
///
/// Interior nodes own both children outright. Trees are never mutated after
/// `fit` returns.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TreeNode {
    /// A terminal node carrying the predicted label.
    Leaf {
        /// Majority label of the training rows that reached this leaf.
        label: usize,
    },
    /// An axis-aligned threshold split.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Observed training value: rows with `row[feature] <= threshold` go left.
        threshold: f64,
        /// Information gain achieved by this split.
        gain: f64,
        /// Number of training rows that reached this node.
        n_samples: usize,
        /// Subtree for rows at or below the threshold.
        left: Box<TreeNode>,
        /// Subtree for rows above the threshold.
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Descend from this node and return the label of the leaf reached by `row`.
    ///
    /// The caller guarantees `row` is at least as wide as every split feature.
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> usize {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[feature.index()] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// Total number of nodes in this subtree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.n_nodes() + right.n_nodes(),
        }
    }

    /// Number of leaves in this subtree.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }

    /// Depth of this subtree; a lone leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Largest feature index used by any split in this subtree.
    pub(crate) fn max_feature_index(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature, left, right, ..
            } => [Some(feature.index()), left.max_feature_index(), right.max_feature_index()]
                .into_iter()
                .flatten()
                .max(),
        }
    }

    /// Add each split's sample-weighted gain to `totals[feature]`.
    pub(crate) fn accumulate_gain(&self, totals: &mut [f64]) {
        if let TreeNode::Split {
            feature,
            gain,
            n_samples,
            left,
            right,
            ..
        } = self
        {
            totals[feature.index()] += gain * *n_samples as f64;
            left.accumulate_gain(totals);
            right.accumulate_gain(totals);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureIndex, TreeNode};

    fn leaf(label: usize) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf { label })
    }

    /// x0 <= 2 -> (x1 <= 5 -> 0 | 1) | 1
    fn make_tree() -> TreeNode {
        TreeNode::Split {
            feature: FeatureIndex::new(0),
            threshold: 2.0,
            gain: 0.25,
            n_samples: 8,
            left: Box::new(TreeNode::Split {
                feature: FeatureIndex::new(1),
                threshold: 5.0,
                gain: 0.5,
                n_samples: 4,
                left: leaf(0),
                right: leaf(1),
            }),
            right: leaf(1),
        }
    }

    #[test]
    fn feature_index_roundtrip() {
        assert_eq!(FeatureIndex::new(7).index(), 7);
        assert_eq!(format!("{}", FeatureIndex::new(3)), "3");
    }

    #[test]
    fn descends_left_on_equal() {
        let tree = make_tree();
        assert_eq!(tree.predict_row(&[2.0, 5.0]), 0);
        assert_eq!(tree.predict_row(&[2.0, 5.5]), 1);
        assert_eq!(tree.predict_row(&[2.1, 0.0]), 1);
    }

    #[test]
    fn shape_queries() {
        let tree = make_tree();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
        assert!(!tree.is_leaf());
        assert!(leaf(0).is_leaf());
        assert_eq!(leaf(0).depth(), 0);
    }

    #[test]
    fn max_feature_index_spans_subtrees() {
        assert_eq!(make_tree().max_feature_index(), Some(1));
        assert_eq!(leaf(0).max_feature_index(), None);
    }

    #[test]
    fn gain_accumulates_per_feature() {
        let mut totals = vec![0.0; 2];
        make_tree().accumulate_gain(&mut totals);
        assert!((totals[0] - 2.0).abs() < 1e-12);
        assert!((totals[1] - 2.0).abs() < 1e-12);
    }
}
