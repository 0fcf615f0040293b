//! Labeled dataset container and random train/test splitting.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::SweepError;

/// Validate a feature matrix against its labels.
///
/// Checks that the dataset is non-empty, rows are rectangular, every value
/// is finite, and there is exactly one label per row. Returns
/// `(n_features, n_classes)` where `n_classes = max(label) + 1`.
pub(crate) fn validate_features_labels(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<(usize, usize), SweepError> {
    if features.is_empty() {
        return Err(SweepError::EmptyDataset);
    }
    if features.len() != labels.len() {
        return Err(SweepError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }

    let n_features = features[0].len();
    if n_features == 0 {
        return Err(SweepError::ZeroFeatures);
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(SweepError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(SweepError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    Ok((n_features, n_classes))
}

/// An immutable labeled dataset.
///
/// `features[sample_idx][feature_idx]` — row-major layout.
/// `labels[sample_idx]` — class labels (zero-based).
///
/// Validated once at construction; held for the duration of a sweep while
/// per-trial splits are derived from it and discarded.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    n_features: usize,
    n_classes: usize,
}

/// One random partition of a [`Dataset`] into disjoint train and test sets.
///
/// Owns its data; each trial builds a fresh split and drops it after scoring.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Training feature rows.
    pub train_features: Vec<Vec<f64>>,
    /// Training labels, parallel to `train_features`.
    pub train_labels: Vec<usize>,
    /// Held-out test feature rows.
    pub test_features: Vec<Vec<f64>>,
    /// Held-out test labels, parallel to `test_features`.
    pub test_labels: Vec<usize>,
}

impl Dataset {
    /// Create a dataset from row-major features and per-row labels.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                              |
    /// |--------------------------------------|-----------------------------------|
    /// | [`SweepError::EmptyDataset`]         | `features` is empty               |
    /// | [`SweepError::LabelCountMismatch`]   | row and label counts differ       |
    /// | [`SweepError::ZeroFeatures`]         | rows have zero feature columns    |
    /// | [`SweepError::FeatureCountMismatch`] | rows have inconsistent lengths    |
    /// | [`SweepError::NonFiniteValue`]       | any value is NaN or infinite      |
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self, SweepError> {
        let (n_features, n_classes) = validate_features_labels(&features, &labels)?;
        Ok(Self {
            features,
            labels,
            n_features,
            n_classes,
        })
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of distinct classes (`max(label) + 1`).
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the labels.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Draw a uniform random train/test split.
    ///
    /// Shuffles the sample indices and holds out `ceil(n_samples *
    /// holdout_fraction)` samples as the test set; the remainder becomes the
    /// training set.
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                              |
    /// |------------------------------------------|-----------------------------------|
    /// | [`SweepError::InvalidHoldoutFraction`]   | fraction not in (0.0, 1.0)        |
    /// | [`SweepError::DegenerateSplit`]          | either partition would be empty   |
    pub fn split(
        &self,
        holdout_fraction: f64,
        rng: &mut impl Rng,
    ) -> Result<TrainTestSplit, SweepError> {
        if !(holdout_fraction > 0.0 && holdout_fraction < 1.0) {
            return Err(SweepError::InvalidHoldoutFraction {
                fraction: holdout_fraction,
            });
        }

        let n_samples = self.features.len();
        let n_test = ((n_samples as f64) * holdout_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(SweepError::DegenerateSplit { n_samples, n_test });
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(rng);

        let (test_idx, train_idx) = indices.split_at(n_test);

        let split = TrainTestSplit {
            train_features: train_idx.iter().map(|&i| self.features[i].clone()).collect(),
            train_labels: train_idx.iter().map(|&i| self.labels[i]).collect(),
            test_features: test_idx.iter().map(|&i| self.features[i].clone()).collect(),
            test_labels: test_idx.iter().map(|&i| self.labels[i]).collect(),
        };

        debug!(
            n_train = split.train_labels.len(),
            n_test = split.test_labels.len(),
            "dataset split drawn"
        );

        Ok(split)
    }
}
