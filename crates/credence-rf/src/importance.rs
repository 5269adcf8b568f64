//! Feature importance aggregation across trees.

use crate::forest::RandomForest;

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score (sums to 1.0 across all features).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Sum per-tree importance vectors and normalize the totals to 1.0.
fn aggregate(per_tree: &[Vec<f64>], n_features: usize) -> Vec<f64> {
    let mut totals = vec![0.0f64; n_features];
    for tree_imp in per_tree {
        for (total, &val) in totals.iter_mut().zip(tree_imp) {
            *total += val;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }
    totals
}

impl RandomForest {
    /// Mean decrease in impurity per feature, normalized to sum to 1.0.
    ///
    /// Each tree's importances are normalized first, so every tree carries
    /// equal weight. All zeros when no tree ever split (or unfitted).
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let per_tree: Vec<Vec<f64>> = self
            .trees
            .iter()
            .map(|tree| tree.feature_importances())
            .collect();
        aggregate(&per_tree, self.n_features)
    }

    /// Pair importances with `names`, sort descending, and assign 1-based ranks.
    ///
    /// Names beyond the training width are ignored; equal importances keep
    /// column order.
    #[must_use]
    pub fn rank_features(&self, names: &[String]) -> Vec<RankedFeature> {
        let mut features: Vec<RankedFeature> = names
            .iter()
            .zip(self.feature_importances())
            .map(|(name, importance)| RankedFeature {
                name: name.clone(),
                importance,
                rank: 0,
            })
            .collect();

        features.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        for (i, feat) in features.iter_mut().enumerate() {
            feat.rank = i + 1;
        }
        features
    }
}
