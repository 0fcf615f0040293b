/// Errors from ensemble training, scoring, and sweep evaluation.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when a subspace size is outside [1, n_features].
    #[error("subspace size {m} is outside [1, {n_features}]")]
    InvalidSubspaceSize {
        /// The invalid subspace size.
        m: usize,
        /// The number of features in the dataset.
        n_features: usize,
    },

    /// Returned when n_trials is zero.
    #[error("n_trials must be at least 1, got {n_trials}")]
    InvalidTrialCount {
        /// The invalid n_trials value provided.
        n_trials: usize,
    },

    /// Returned when the held-out fraction is not in (0.0, 1.0).
    #[error("holdout_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidHoldoutFraction {
        /// The invalid holdout_fraction value provided.
        fraction: f64,
    },

    /// Returned when a train/test split would leave one side empty.
    #[error("split of {n_samples} samples with {n_test} held out leaves an empty partition")]
    DegenerateSplit {
        /// Total number of samples being split.
        n_samples: usize,
        /// Number of samples assigned to the test side.
        n_test: usize,
    },

    /// Returned when the sweep is given no subspace sizes to evaluate.
    #[error("m_values must contain at least one subspace size")]
    EmptySubspaceList,

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when the dataset has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the dataset has zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the feature and label arrays have different lengths.
    #[error("got {n_samples} feature rows but {n_labels} labels")]
    LabelCountMismatch {
        /// The number of feature rows.
        n_samples: usize,
        /// The number of labels.
        n_labels: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when predicted and true label arrays have different lengths.
    #[error("got {n_predicted} predictions but {n_labels} true labels")]
    ScoreLengthMismatch {
        /// The number of predicted labels.
        n_predicted: usize,
        /// The number of true labels.
        n_labels: usize,
    },
}
