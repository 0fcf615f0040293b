use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::dataset::validate_features_labels;
use crate::error::SweepError;
use crate::metrics::plurality;
use crate::node::Node;
use crate::split::{SplitCriterion, find_best_split};

/// Configuration for a single decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Entropy`             |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `subspace`          | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) subspace: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Entropy,
            max_depth: None,
            min_samples_split: 2,
            subspace: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` means grow until all leaves are pure or no valid split remains.
    /// `Some(d)` limits depth to `d` levels (root is depth 0).
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

    /// Set the number of features considered at each split decision.
    ///
    /// `None` means every split considers all features. `Some(m)` draws a
    /// fresh random subset of `m` feature columns at each internal node,
    /// the random-subspace restriction of a random-forest member tree.
    #[must_use]
    pub fn with_subspace(mut self, subspace: Option<usize>) -> Self {
        self.subspace = subspace;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the minimum samples required to split a node.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Return the per-split feature subspace size, if set.
    #[must_use]
    pub fn subspace(&self) -> Option<usize> {
        self.subspace
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]` — row-major layout.
    /// `labels[sample_idx]` — class labels (zero-based).
    ///
    /// # Errors
    ///
    /// | Variant                                  | When                                     |
    /// |------------------------------------------|------------------------------------------|
    /// | [`SweepError::EmptyDataset`]             | `features` is empty                      |
    /// | [`SweepError::LabelCountMismatch`]       | row and label counts differ              |
    /// | [`SweepError::ZeroFeatures`]             | rows have zero feature columns           |
    /// | [`SweepError::FeatureCountMismatch`]     | rows have inconsistent lengths           |
    /// | [`SweepError::NonFiniteValue`]           | any value is NaN or infinite             |
    /// | [`SweepError::InvalidSubspaceSize`]      | `subspace` is outside [1, n_features]    |
    /// | [`SweepError::InvalidMaxDepth`]          | `max_depth` is `Some(0)`                 |
    /// | [`SweepError::InvalidMinSamplesSplit`]   | `min_samples_split` < 2                  |
    #[instrument(skip(self, features, labels), fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, SweepError> {
        let (n_features, n_classes) = validate_features_labels(features, labels)?;

        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(SweepError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(SweepError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }

        let subspace = self.subspace.unwrap_or(n_features);
        if subspace == 0 || subspace > n_features {
            return Err(SweepError::InvalidSubspaceSize {
                m: subspace,
                n_features,
            });
        }

        let n_samples = features.len();
        debug!(n_samples, n_features, n_classes, subspace, "fitting decision tree");

        // Column-major layout for the split search.
        let col_features: Vec<Vec<f64>> = (0..n_features)
            .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
            .collect();

        let mut builder = TreeBuilder {
            col_features,
            labels,
            n_classes,
            criterion: self.criterion,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            subspace,
            nodes: Vec::new(),
        };

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let sample_indices: Vec<usize> = (0..n_samples).collect();
        builder.grow(&sample_indices, 0, &mut rng);

        debug!(n_nodes = builder.nodes.len(), "decision tree built");

        Ok(DecisionTree {
            nodes: builder.nodes,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Working state for recursive tree construction.
struct TreeBuilder<'a> {
    col_features: Vec<Vec<f64>>,
    labels: &'a [usize],
    n_classes: usize,
    criterion: SplitCriterion,
    max_depth: Option<usize>,
    min_samples_split: usize,
    subspace: usize,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `sample_indices` and return its arena index.
    fn grow(&mut self, sample_indices: &[usize], depth: usize, rng: &mut ChaCha8Rng) -> usize {
        let n_samples = sample_indices.len();

        let mut class_counts = vec![0usize; self.n_classes];
        for &si in sample_indices {
            class_counts[self.labels[si]] += 1;
        }
        let impurity = self.criterion.impurity(&class_counts, n_samples);

        let pure = impurity.value() == 0.0;
        let too_few = n_samples < self.min_samples_split;
        let depth_exceeded = self.max_depth.is_some_and(|max_d| depth >= max_d);

        if pure || too_few || depth_exceeded {
            return self.push_leaf(&class_counts, impurity, n_samples);
        }

        let split = find_best_split(
            &self.col_features,
            self.labels,
            sample_indices,
            self.n_classes,
            self.criterion,
            self.subspace,
            rng,
        );
        let split = match split {
            Some(s) => s,
            None => return self.push_leaf(&class_counts, impurity, n_samples),
        };

        // Arena pattern: reserve the index, recurse, then overwrite.
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            prediction: 0,
            impurity,
            n_samples,
        });

        let left = self.grow(&split.left_indices, depth + 1, rng);
        let right = self.grow(&split.right_indices, depth + 1, rng);

        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples,
        };
        node_idx
    }

    fn push_leaf(
        &mut self,
        class_counts: &[usize],
        impurity: crate::node::Impurity,
        n_samples: usize,
    ) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            prediction: plurality(class_counts),
            impurity,
            n_samples,
        });
        idx
    }
}

/// A fitted decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references for
/// cache-friendly traversal.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// Traverses from the root (index 0): at each split, goes left when
    /// `sample[feature] <= threshold`, right otherwise.
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
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { prediction, .. } => return Ok(*prediction),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Return the number of features the tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes the tree was trained on.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, d)) = stack.pop() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
            }
        }
        max_depth
    }
}
