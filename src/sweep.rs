//! Median-accuracy sweep over feature-subspace sizes.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::dataset::Dataset;
use crate::ensemble::EnsembleConfig;
use crate::error::SweepError;
use crate::metrics::median;
use crate::split::SplitCriterion;

/// Sweep configuration: which subspace sizes to evaluate and how.
///
/// Construct via [`SubspaceSweep::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter          | Default   |
/// |--------------------|-----------|
/// | `n_trials`         | 50        |
/// | `n_trees`          | 10        |
/// | `holdout_fraction` | 0.2       |
/// | `criterion`        | `Entropy` |
/// | `seed`             | 42        |
#[derive(Debug, Clone)]
pub struct SubspaceSweep {
    m_values: Vec<usize>,
    n_trials: usize,
    n_trees: usize,
    holdout_fraction: f64,
    criterion: SplitCriterion,
    seed: u64,
}

/// Median accuracies for one subspace size.
#[derive(Debug, Clone, Copy)]
pub struct SweepPoint {
    /// The subspace size this point was evaluated at.
    pub m: usize,
    /// Median bagging accuracy across trials.
    pub bagging_accuracy: f64,
    /// Median random-subspace accuracy across trials.
    pub subspace_accuracy: f64,
}

/// Results of a full sweep, one point per requested subspace size.
#[derive(Debug, Clone)]
pub struct SweepResult {
    points: Vec<SweepPoint>,
    n_trials: usize,
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
}

impl SweepResult {
    /// Return the sweep points in the caller's `m_values` order.
    #[must_use]
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// Look up the point for a given subspace size.
    #[must_use]
    pub fn get(&self, m: usize) -> Option<&SweepPoint> {
        self.points.iter().find(|p| p.m == m)
    }

    /// Return the number of trials per subspace size.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// Return the number of samples in the evaluated dataset.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Return the number of features in the evaluated dataset.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes in the evaluated dataset.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

impl SubspaceSweep {
    /// Create a sweep over the given subspace sizes.
    ///
    /// The sizes are evaluated, and reported, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::EmptySubspaceList`] if `m_values` is empty.
    pub fn new(m_values: Vec<usize>) -> Result<Self, SweepError> {
        if m_values.is_empty() {
            return Err(SweepError::EmptySubspaceList);
        }
        Ok(Self {
            m_values,
            n_trials: 50,
            n_trees: 10,
            holdout_fraction: 0.2,
            criterion: SplitCriterion::Entropy,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the number of random train/test trials per subspace size.
    #[must_use]
    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Set the number of trees per ensemble.
    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    /// Set the fraction of samples held out as the test set per trial.
    #[must_use]
    pub fn with_holdout_fraction(mut self, holdout_fraction: f64) -> Self {
        self.holdout_fraction = holdout_fraction;
        self
    }

    /// Set the split quality criterion used by every tree.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the master random seed.
    ///
    /// All split, bootstrap, and subspace-selection randomness derives from
    /// this one seed, so repeated runs with identical inputs reproduce
    /// identical results.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the subspace sizes under evaluation.
    #[must_use]
    pub fn m_values(&self) -> &[usize] {
        &self.m_values
    }

    /// Return the number of trials per subspace size.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// Return the number of trees per ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the held-out fraction per trial.
    #[must_use]
    pub fn holdout_fraction(&self) -> f64 {
        self.holdout_fraction
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the master random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the full sweep against a dataset.
    ///
    /// For each subspace size `m`, runs `n_trials` trials. Every trial draws
    /// a fresh random train/test split, trains one bagging ensemble and one
    /// `m`-subspace ensemble on the training side, and scores both on the
    /// held-out side. The two per-trial accuracy sequences are reduced to
    /// their medians, robust to outlier splits.
    ///
    /// Execution is sequential; the first error aborts the run with no
    /// partial result.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                 |
    /// |------------------------------------------|--------------------------------------|
    /// | [`SweepError::InvalidTrialCount`]        | `n_trials` is zero                   |
    /// | [`SweepError::InvalidTreeCount`]         | `n_trees` is zero                    |
    /// | [`SweepError::InvalidSubspaceSize`]      | any `m` outside [1, n_features]      |
    /// | [`SweepError::InvalidHoldoutFraction`]   | fraction not in (0.0, 1.0)           |
    /// | [`SweepError::DegenerateSplit`]          | a split would leave one side empty   |
    /// | Other training errors                    | from underlying ensemble fitting     |
    #[instrument(skip_all, fields(n_m_values = self.m_values.len(), n_trials = self.n_trials))]
    pub fn evaluate(&self, dataset: &Dataset) -> Result<SweepResult, SweepError> {
        if self.n_trials == 0 {
            return Err(SweepError::InvalidTrialCount { n_trials: 0 });
        }
        if self.n_trees == 0 {
            return Err(SweepError::InvalidTreeCount { n_trees: 0 });
        }

        // Fail fast on any out-of-range m before burning trial time.
        let n_features = dataset.n_features();
        for &m in &self.m_values {
            if m == 0 || m > n_features {
                return Err(SweepError::InvalidSubspaceSize { m, n_features });
            }
        }

        info!(
            n_samples = dataset.n_samples(),
            n_features,
            n_classes = dataset.n_classes(),
            n_trees = self.n_trees,
            "starting subspace sweep"
        );

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut points = Vec::with_capacity(self.m_values.len());

        for &m in &self.m_values {
            let mut bagging_scores = Vec::with_capacity(self.n_trials);
            let mut subspace_scores = Vec::with_capacity(self.n_trials);

            for trial in 0..self.n_trials {
                let split = dataset.split(self.holdout_fraction, &mut rng)?;

                let bagging = EnsembleConfig::bagging(self.n_trees)?
                    .with_criterion(self.criterion)
                    .with_seed(rng.r#gen())
                    .fit(&split.train_features, &split.train_labels)?;
                let subspace = EnsembleConfig::random_subspace(self.n_trees, m)?
                    .with_criterion(self.criterion)
                    .with_seed(rng.r#gen())
                    .fit(&split.train_features, &split.train_labels)?;

                let bagging_score = bagging.score(&split.test_features, &split.test_labels)?;
                let subspace_score = subspace.score(&split.test_features, &split.test_labels)?;

                debug!(m, trial, bagging_score, subspace_score, "trial scored");

                bagging_scores.push(bagging_score);
                subspace_scores.push(subspace_score);
            }

            let point = SweepPoint {
                m,
                bagging_accuracy: median(&bagging_scores)
                    .expect("n_trials >= 1 guarantees at least one score"),
                subspace_accuracy: median(&subspace_scores)
                    .expect("n_trials >= 1 guarantees at least one score"),
            };
            info!(
                m,
                bagging_accuracy = point.bagging_accuracy,
                subspace_accuracy = point.subspace_accuracy,
                "subspace size evaluated"
            );
            points.push(point);
        }

        Ok(SweepResult {
            points,
            n_trials: self.n_trials,
            n_samples: dataset.n_samples(),
            n_features,
            n_classes: dataset.n_classes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 100 samples, 2 balanced classes, 10 features; features 0-1 informative.
    fn make_toy_dataset() -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut features = Vec::with_capacity(100);
        let mut labels = Vec::with_capacity(100);
        for i in 0..100 {
            let class = i % 2;
            labels.push(class);
            let row: Vec<f64> = (0..10)
                .map(|f| {
                    let base = if f < 2 { class as f64 * 4.0 } else { 0.0 };
                    base + rng.r#gen::<f64>()
                })
                .collect();
            features.push(row);
        }
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn toy_scenario_point_per_m_value() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![1, 5, 10])
            .unwrap()
            .with_n_trials(5)
            .with_seed(42);
        let result = sweep.evaluate(&dataset).unwrap();

        assert_eq!(result.points().len(), 3);
        let ms: Vec<usize> = result.points().iter().map(|p| p.m).collect();
        assert_eq!(ms, vec![1, 5, 10]);
        for point in result.points() {
            assert!((0.0..=1.0).contains(&point.bagging_accuracy));
            assert!((0.0..=1.0).contains(&point.subspace_accuracy));
        }
        assert_eq!(result.n_trials(), 5);
        assert_eq!(result.n_samples(), 100);
        assert_eq!(result.n_features(), 10);
        assert_eq!(result.n_classes(), 2);
    }

    #[test]
    fn result_order_follows_caller_order() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![10, 1])
            .unwrap()
            .with_n_trials(2)
            .with_n_trees(3)
            .with_seed(42);
        let result = sweep.evaluate(&dataset).unwrap();
        let ms: Vec<usize> = result.points().iter().map(|p| p.m).collect();
        assert_eq!(ms, vec![10, 1]);
    }

    #[test]
    fn get_looks_up_by_m() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![1, 5])
            .unwrap()
            .with_n_trials(2)
            .with_n_trees(3)
            .with_seed(42);
        let result = sweep.evaluate(&dataset).unwrap();
        assert!(result.get(5).is_some());
        assert!(result.get(7).is_none());
    }

    #[test]
    fn deterministic_with_same_seed() {
        let dataset = make_toy_dataset();
        let run = || {
            SubspaceSweep::new(vec![2, 10])
                .unwrap()
                .with_n_trials(3)
                .with_n_trees(5)
                .with_seed(123)
                .evaluate(&dataset)
                .unwrap()
        };
        let r1 = run();
        let r2 = run();
        for (p1, p2) in r1.points().iter().zip(r2.points()) {
            assert_eq!(p1.m, p2.m);
            assert_eq!(p1.bagging_accuracy, p2.bagging_accuracy);
            assert_eq!(p1.subspace_accuracy, p2.subspace_accuracy);
        }
    }

    #[test]
    fn empty_m_values_error() {
        assert!(matches!(
            SubspaceSweep::new(vec![]).unwrap_err(),
            SweepError::EmptySubspaceList
        ));
    }

    #[test]
    fn out_of_range_m_fails_before_trials() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![1, 11]).unwrap().with_n_trials(5);
        let err = sweep.evaluate(&dataset).unwrap_err();
        assert!(matches!(
            err,
            SweepError::InvalidSubspaceSize { m: 11, n_features: 10 }
        ));
    }

    #[test]
    fn zero_trials_error() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![1]).unwrap().with_n_trials(0);
        assert!(matches!(
            sweep.evaluate(&dataset).unwrap_err(),
            SweepError::InvalidTrialCount { n_trials: 0 }
        ));
    }

    #[test]
    fn zero_trees_error() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![1]).unwrap().with_n_trees(0);
        assert!(matches!(
            sweep.evaluate(&dataset).unwrap_err(),
            SweepError::InvalidTreeCount { n_trees: 0 }
        ));
    }

    #[test]
    fn single_trial_single_tree_runs() {
        let dataset = make_toy_dataset();
        let sweep = SubspaceSweep::new(vec![1])
            .unwrap()
            .with_n_trials(1)
            .with_n_trees(1)
            .with_seed(42);
        let result = sweep.evaluate(&dataset).unwrap();
        assert_eq!(result.points().len(), 1);
    }
}
