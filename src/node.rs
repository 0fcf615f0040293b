use std::fmt;

/// Criterion-agnostic impurity value (entropy or Gini).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    /// Create a new impurity value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by arena
/// index rather than pointers.
#[derive(Debug, Clone)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Zero-based feature column used for the split.
        feature: usize,
        /// Threshold value: samples with feature <= threshold go left.
        threshold: f64,
        /// Arena index of the left child.
        left: usize,
        /// Arena index of the right child.
        right: usize,
        /// Number of training samples that reached this node.
        n_samples: usize,
    },
    /// A terminal leaf node.
    Leaf {
        /// Predicted class: plurality label of the leaf's training samples,
        /// ties broken toward the lowest label value.
        prediction: usize,
        /// Impurity of the leaf's training samples.
        impurity: Impurity,
        /// Number of training samples in this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
