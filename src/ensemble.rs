//! Bootstrap-aggregated tree ensembles: bagging and random subspace.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::dataset::validate_features_labels;
use crate::error::SweepError;
use crate::metrics::{accuracy, plurality};
use crate::split::SplitCriterion;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// How many features each member tree considers at a split decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSubspace {
    /// Every split considers all features — the bagging ensemble.
    All,
    /// Every split considers `m` randomly chosen features — the
    /// random-subspace ("random forest") ensemble.
    Fixed(usize),
}

/// Configuration for a bootstrap-aggregated tree ensemble.
///
/// Construct via [`EnsembleConfig::bagging`] or
/// [`EnsembleConfig::random_subspace`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default            |
/// |---------------------|--------------------|
/// | `criterion`         | `Entropy`          |
/// | `max_depth`         | `None` (unlimited) |
/// | `min_samples_split` | 2                  |
/// | `seed`              | 42                 |
#[derive(Debug, Clone)]
pub struct EnsembleConfig {
    pub(crate) n_trees: usize,
    pub(crate) subspace: FeatureSubspace,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) seed: u64,
}

impl EnsembleConfig {
    /// Create a bagging config: bootstrap resamples, unrestricted splits.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn bagging(n_trees: usize) -> Result<Self, SweepError> {
        Self::with_subspace_strategy(n_trees, FeatureSubspace::All)
    }

    /// Create a random-subspace config: bootstrap resamples plus `m`
    /// randomly chosen features per split decision.
    ///
    /// `m` is validated against the dataset's feature count at fit time;
    /// `m` equal to the feature count is a valid baseline that degenerates
    /// to bagging behavior.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn random_subspace(n_trees: usize, m: usize) -> Result<Self, SweepError> {
        Self::with_subspace_strategy(n_trees, FeatureSubspace::Fixed(m))
    }

    fn with_subspace_strategy(
        n_trees: usize,
        subspace: FeatureSubspace,
    ) -> Result<Self, SweepError> {
        if n_trees == 0 {
            return Err(SweepError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            subspace,
            criterion: SplitCriterion::Entropy,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum member-tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the random seed for bootstrap resampling and subspace selection.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of member trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the feature subspace strategy.
    #[must_use]
    pub fn subspace(&self) -> FeatureSubspace {
        self.subspace
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the maximum member-tree depth, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train the ensemble on the provided row-major dataset.
    ///
    /// Each member draws a bootstrap resample (with replacement, same size
    /// as the training set) from a per-tree RNG seeded off the master seed,
    /// then fits one decision tree on it. Training is sequential; each
    /// trial's ensembles are transient and dropped after scoring.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                   |
    /// |--------------------------------------|----------------------------------------|
    /// | [`SweepError::EmptyDataset`]         | `features` is empty                    |
    /// | [`SweepError::LabelCountMismatch`]   | row and label counts differ            |
    /// | [`SweepError::ZeroFeatures`]         | rows have zero feature columns         |
    /// | [`SweepError::FeatureCountMismatch`] | rows have inconsistent lengths         |
    /// | [`SweepError::NonFiniteValue`]       | any value is NaN or infinite           |
    /// | [`SweepError::InvalidSubspaceSize`]  | `Fixed(m)` outside [1, n_features]     |
    #[instrument(skip_all, fields(n_trees = self.n_trees, n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<Ensemble, SweepError> {
        let (n_features, n_classes) = validate_features_labels(features, labels)?;

        let subspace = match self.subspace {
            FeatureSubspace::All => n_features,
            FeatureSubspace::Fixed(m) => {
                if m == 0 || m > n_features {
                    return Err(SweepError::InvalidSubspaceSize { m, n_features });
                }
                m
            }
        };

        let n_samples = features.len();
        debug!(n_samples, n_features, n_classes, subspace, "training ensemble");

        let mut master_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);

        for _ in 0..self.n_trees {
            let mut rng = ChaCha8Rng::seed_from_u64(master_rng.r#gen());

            // Bootstrap resample: n_samples draws with replacement.
            let mut boot_features = Vec::with_capacity(n_samples);
            let mut boot_labels = Vec::with_capacity(n_samples);
            for _ in 0..n_samples {
                let idx = rng.gen_range(0..n_samples);
                boot_features.push(features[idx].clone());
                boot_labels.push(labels[idx]);
            }

            let tree = DecisionTreeConfig::new()
                .with_criterion(self.criterion)
                .with_max_depth(self.max_depth)
                .with_min_samples_split(self.min_samples_split)
                .with_subspace(Some(subspace))
                .with_seed(rng.r#gen())
                .fit(&boot_features, &boot_labels)?;
            trees.push(tree);
        }

        debug!(n_trees_trained = trees.len(), "ensemble training complete");

        Ok(Ensemble {
            trees,
            n_features,
            n_classes,
        })
    }
}

/// A fitted ensemble of bootstrap-trained decision trees.
#[derive(Debug, Clone)]
pub struct Ensemble {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl Ensemble {
    /// Predict the class label for a single sample.
    ///
    /// Each member tree votes; the most frequent label wins, with ties
    /// broken deterministically toward the lowest label value.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, SweepError> {
        if sample.len() != self.n_features {
            return Err(SweepError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut votes = vec![0usize; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(sample)?] += 1;
        }
        Ok(plurality(&votes))
    }

    /// Predict class labels for a batch of samples.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::PredictionFeatureMismatch`] if any sample has
    /// the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, SweepError> {
        features.iter().map(|sample| self.predict(sample)).collect()
    }

    /// Fraction of test samples the ensemble classifies correctly.
    ///
    /// # Errors
    ///
    /// | Variant                                      | When                                 |
    /// |----------------------------------------------|--------------------------------------|
    /// | [`SweepError::PredictionFeatureMismatch`]    | a sample has the wrong feature count |
    /// | [`SweepError::ScoreLengthMismatch`]          | features/labels lengths differ       |
    /// | [`SweepError::EmptyDataset`]                 | the test set is empty                |
    pub fn score(
        &self,
        test_features: &[Vec<f64>],
        test_labels: &[usize],
    ) -> Result<f64, SweepError> {
        let predictions = self.predict_batch(test_features)?;
        accuracy(&predictions, test_labels)
    }

    /// Return the number of member trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features the ensemble was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes the ensemble was trained on.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generate a simple 3-class separable dataset.
    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64 * 0.15, 0.5]);
            labels.push(0);
        }
        for i in 0..20 {
            features.push(vec![10.0 + i as f64 * 0.15, 0.5]);
            labels.push(1);
        }
        for i in 0..20 {
            features.push(vec![20.0 + i as f64 * 0.15, 0.5]);
            labels.push(2);
        }
        (features, labels)
    }

    #[test]
    fn bagging_three_class_accuracy() {
        let (features, labels) = make_separable_data();
        let ensemble = EnsembleConfig::bagging(25)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();
        let acc = ensemble.score(&features, &labels).unwrap();
        assert!(acc > 0.9, "accuracy = {acc}");
    }

    #[test]
    fn random_subspace_three_class_accuracy() {
        let (features, labels) = make_separable_data();
        let ensemble = EnsembleConfig::random_subspace(25, 1)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();
        let acc = ensemble.score(&features, &labels).unwrap();
        assert!(acc > 0.8, "accuracy = {acc}");
    }

    #[test]
    fn accuracy_within_unit_interval() {
        let (features, labels) = make_separable_data();
        for config in [
            EnsembleConfig::bagging(5).unwrap(),
            EnsembleConfig::random_subspace(5, 2).unwrap(),
        ] {
            let acc = config
                .fit(&features, &labels)
                .unwrap()
                .score(&features, &labels)
                .unwrap();
            assert!((0.0..=1.0).contains(&acc), "accuracy = {acc}");
        }
    }

    #[test]
    fn single_tree_ensemble() {
        let (features, labels) = make_separable_data();
        let ensemble = EnsembleConfig::bagging(1)
            .unwrap()
            .with_seed(42)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(ensemble.n_trees(), 1);
        let acc = ensemble.score(&features, &labels).unwrap();
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn full_subspace_matches_bagging_predictions() {
        // Fixed(n_features) restricts nothing, so with the same seed the
        // member trees — and therefore every vote — are identical.
        let (features, labels) = make_separable_data();
        let bagging = EnsembleConfig::bagging(10)
            .unwrap()
            .with_seed(7)
            .fit(&features, &labels)
            .unwrap();
        let full = EnsembleConfig::random_subspace(10, 2)
            .unwrap()
            .with_seed(7)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(
            bagging.predict_batch(&features).unwrap(),
            full.predict_batch(&features).unwrap()
        );
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels) = make_separable_data();
        let e1 = EnsembleConfig::random_subspace(10, 1)
            .unwrap()
            .with_seed(99)
            .fit(&features, &labels)
            .unwrap();
        let e2 = EnsembleConfig::random_subspace(10, 1)
            .unwrap()
            .with_seed(99)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(
            e1.predict_batch(&features).unwrap(),
            e2.predict_batch(&features).unwrap()
        );
    }

    #[test]
    fn invalid_tree_count_error() {
        assert!(matches!(
            EnsembleConfig::bagging(0).unwrap_err(),
            SweepError::InvalidTreeCount { n_trees: 0 }
        ));
        assert!(EnsembleConfig::random_subspace(0, 1).is_err());
    }

    #[test]
    fn subspace_out_of_range_error() {
        let (features, labels) = make_separable_data();
        let err = EnsembleConfig::random_subspace(5, 3)
            .unwrap()
            .fit(&features, &labels)
            .unwrap_err();
        assert!(matches!(
            err,
            SweepError::InvalidSubspaceSize { m: 3, n_features: 2 }
        ));
    }

    #[test]
    fn zero_subspace_error() {
        let (features, labels) = make_separable_data();
        let err = EnsembleConfig::random_subspace(5, 0)
            .unwrap()
            .fit(&features, &labels)
            .unwrap_err();
        assert!(matches!(err, SweepError::InvalidSubspaceSize { m: 0, .. }));
    }

    #[test]
    fn empty_dataset_error() {
        let err = EnsembleConfig::bagging(5).unwrap().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, SweepError::EmptyDataset));
    }

    #[test]
    fn prediction_feature_mismatch() {
        let (features, labels) = make_separable_data();
        let ensemble = EnsembleConfig::bagging(3)
            .unwrap()
            .fit(&features, &labels)
            .unwrap();
        let err = ensemble.predict(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            SweepError::PredictionFeatureMismatch { expected: 2, got: 3 }
        ));
    }
}
