//! Random Forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::tree::{DecisionTree, DecisionTreeConfig, check_training_batch};

/// A bagged ensemble of decision trees.
///
/// Created unfitted by [`RandomForest::new`]. Each successful `fit` replaces
/// the whole tree collection; a failed one leaves the forest untouched.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    pub(crate) config: RandomForestConfig,
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
}

/// Draw `n_samples` indices uniformly with replacement from `0..n_samples`.
pub(crate) fn bootstrap_indices(n_samples: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Everything one tree needs, drawn up front so training order cannot
/// influence the result.
struct TreePlan {
    indices: Vec<usize>,
    seed: u64,
}

impl RandomForest {
    /// Create an unfitted forest.
    #[must_use]
    pub fn new(config: RandomForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    /// Train the ensemble with a generator seeded from the configured seed.
    ///
    /// # Errors
    ///
    /// See [`RandomForest::fit_with_rng`].
    pub fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), RfError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.fit_with_rng(features, labels, &mut rng)
    }

    /// Train the ensemble, drawing all randomness from `rng`.
    ///
    /// For each tree, in order, a bootstrap sample of `n` indices and a tree
    /// seed are drawn from `rng`; the trees are then trained in parallel.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                              |
    /// |-----------------------------------|---------------------------------------------------|
    /// | [`RfError::EmptyDataset`]         | `features` is empty                               |
    /// | [`RfError::LabelCountMismatch`]   | `labels.len() != features.len()`                  |
    /// | [`RfError::ZeroFeatures`]         | rows have zero feature columns                    |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths                    |
    /// | [`RfError::NonFiniteValue`]       | any value is NaN or infinite                      |
    /// | [`RfError::InvalidMaxDepth`]      | `max_depth` is `Some(0)`                          |
    /// | [`RfError::InvalidMaxFeatures`]   | resolved max_features is outside [1, n_features]  |
    #[instrument(skip_all, fields(n_estimators = self.config.n_estimators, n_samples = features.len()))]
    pub fn fit_with_rng(
        &mut self,
        features: &[Vec<f64>],
        labels: &[usize],
        rng: &mut impl Rng,
    ) -> Result<(), RfError> {
        let n_features = check_training_batch(features, labels)?;
        let n_samples = features.len();

        if self.config.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        let max_features_resolved = self.config.max_features.resolve(n_features)?;
        let per_split_features = self
            .config
            .feature_subsampling
            .then_some(max_features_resolved);

        info!(
            n_estimators = self.config.n_estimators,
            n_samples,
            n_features,
            max_depth = ?self.config.max_depth,
            per_split_features = ?per_split_features,
            "training random forest"
        );

        let plans: Vec<TreePlan> = (0..self.config.n_estimators)
            .map(|_| {
                let indices = bootstrap_indices(n_samples, rng);
                let seed = rng.r#gen::<u64>();
                TreePlan { indices, seed }
            })
            .collect();

        let tree_config = DecisionTreeConfig::new()
            .with_max_depth(self.config.max_depth)
            .with_max_features(per_split_features);

        let trees: Vec<DecisionTree> = plans
            .into_par_iter()
            .map(|plan| -> Result<DecisionTree, RfError> {
                let boot_features: Vec<Vec<f64>> =
                    plan.indices.iter().map(|&i| features[i].clone()).collect();
                let boot_labels: Vec<usize> = plan.indices.iter().map(|&i| labels[i]).collect();

                let mut tree = DecisionTree::new(tree_config.clone().with_seed(plan.seed));
                tree.fit(&boot_features, &boot_labels)?;
                Ok(tree)
            })
            .collect::<Result<_, RfError>>()?;

        debug!(
            n_trees_trained = trees.len(),
            total_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>(),
            "tree training complete"
        );

        self.trees = trees;
        self.n_features = n_features;

        info!("random forest training complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{RandomForest, bootstrap_indices};
    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::tree::{DecisionTree, DecisionTreeConfig};
    use crate::RfError;

    /// Two well-separated classes on feature 0; feature 1 is noise.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64 * 0.15, (i % 4) as f64]);
            labels.push(0);
        }
        for i in 0..20 {
            features.push(vec![10.0 + i as f64 * 0.15, (i % 4) as f64]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn bootstrap_draws_with_replacement_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let indices = bootstrap_indices(50, &mut rng);
        assert_eq!(indices.len(), 50);
        assert!(indices.iter().all(|&i| i < 50));
        let mut unique = indices.clone();
        unique.sort_unstable();
        unique.dedup();
        assert!(unique.len() < 50, "50 draws with replacement should repeat");
    }

    #[test]
    fn separable_accuracy() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(25).unwrap().with_seed(42));
        forest.fit(&features, &labels).unwrap();

        let predictions = forest.predict(&features).unwrap();
        let correct = predictions
            .iter()
            .zip(&labels)
            .filter(|&(&p, &l)| p == l)
            .count();
        let accuracy = correct as f64 / labels.len() as f64;
        assert!(accuracy > 0.95, "accuracy = {accuracy}");
        assert_eq!(forest.n_trees(), 25);
    }

    #[test]
    fn single_tree_forest_matches_tree_on_same_bootstrap() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(1).unwrap().with_seed(7));
        forest.fit(&features, &labels).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let indices = bootstrap_indices(features.len(), &mut rng);
        let boot_features: Vec<Vec<f64>> = indices.iter().map(|&i| features[i].clone()).collect();
        let boot_labels: Vec<usize> = indices.iter().map(|&i| labels[i]).collect();
        let mut tree = DecisionTree::new(DecisionTreeConfig::new());
        tree.fit(&boot_features, &boot_labels).unwrap();

        let probe: Vec<Vec<f64>> = (0..60).map(|i| vec![i as f64 * 0.25, (i % 5) as f64]).collect();
        assert_eq!(forest.predict(&probe).unwrap(), tree.predict(&probe).unwrap());
        assert_eq!(forest.trees()[0].root(), tree.root());
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable_data();
        let config = RandomForestConfig::new(10).unwrap().with_seed(99);
        let mut a = RandomForest::new(config.clone());
        let mut b = RandomForest::new(config);
        a.fit(&features, &labels).unwrap();
        b.fit(&features, &labels).unwrap();
        for (ta, tb) in a.trees().iter().zip(b.trees()) {
            assert_eq!(ta.root(), tb.root());
        }
    }

    #[test]
    fn explicit_rng_matches_configured_seed() {
        let (features, labels) = make_separable_data();
        let config = RandomForestConfig::new(5).unwrap().with_seed(11);
        let mut a = RandomForest::new(config.clone());
        a.fit(&features, &labels).unwrap();
        let mut b = RandomForest::new(config);
        b.fit_with_rng(&features, &labels, &mut ChaCha8Rng::seed_from_u64(11))
            .unwrap();
        assert_eq!(a.predict(&features).unwrap(), b.predict(&features).unwrap());
    }

    #[test]
    fn refit_replaces_trees() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(3).unwrap());
        forest.fit(&features, &labels).unwrap();
        forest.fit(&features[..10], &labels[..10]).unwrap();
        assert_eq!(forest.n_trees(), 3);
        // The second batch holds only class 0.
        assert!(forest.predict(&features).unwrap().iter().all(|&p| p == 0));
    }

    #[test]
    fn failed_fit_keeps_previous_ensemble() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(RandomForestConfig::new(4).unwrap());
        forest.fit(&features, &labels).unwrap();
        let before = forest.predict(&features).unwrap();

        let err = forest.fit(&features, &labels[..3]).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { .. }));
        assert_eq!(forest.n_trees(), 4);
        assert_eq!(forest.predict(&features).unwrap(), before);
    }

    #[test]
    fn failed_first_fit_stays_unfitted() {
        let mut forest = RandomForest::new(RandomForestConfig::new(4).unwrap());
        assert!(forest.fit(&[], &[]).is_err());
        assert!(!forest.is_fitted());
        assert!(matches!(forest.predict(&[vec![1.0]]), Err(RfError::NotFitted)));
    }

    #[test]
    fn invalid_max_features_rejected_at_fit() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(
            RandomForestConfig::new(2)
                .unwrap()
                .with_max_features(MaxFeatures::Fixed(5)),
        );
        let err = forest.fit(&features, &labels).unwrap_err();
        assert!(matches!(
            err,
            RfError::InvalidMaxFeatures { max_features: 5, n_features: 2 }
        ));
    }

    #[test]
    fn max_features_unused_without_subsampling() {
        let (features, labels) = make_separable_data();
        let base = RandomForestConfig::new(5).unwrap().with_seed(5);
        let mut all = RandomForest::new(base.clone());
        let mut one = RandomForest::new(base.with_max_features(MaxFeatures::Fixed(1)));
        all.fit(&features, &labels).unwrap();
        one.fit(&features, &labels).unwrap();
        for (ta, tb) in all.trees().iter().zip(one.trees()) {
            assert_eq!(ta.root(), tb.root());
        }
    }

    #[test]
    fn subsampling_still_learns_separable_data() {
        let (features, labels) = make_separable_data();
        let mut forest = RandomForest::new(
            RandomForestConfig::new(30)
                .unwrap()
                .with_max_features(MaxFeatures::Fixed(1))
                .with_feature_subsampling(true)
                .with_seed(42),
        );
        forest.fit(&features, &labels).unwrap();
        let predictions = forest.predict(&features).unwrap();
        let correct = predictions.iter().zip(&labels).filter(|&(&p, &l)| p == l).count();
        assert!(correct as f64 / labels.len() as f64 > 0.9);
    }
}
