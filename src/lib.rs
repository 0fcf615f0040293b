//! Bagging vs. random-subspace ensemble accuracy sweeps.
//!
//! Given a labeled dataset, repeatedly split it into train/test partitions,
//! train a bootstrap-aggregated ("bagging") decision-tree ensemble and a
//! random-subspace ("random forest") ensemble per split, and report the
//! median test accuracy for each requested subspace size `m`.
//!
//! ```
//! use subspace_sweep::{Dataset, SubspaceSweep};
//!
//! let features: Vec<Vec<f64>> = (0..60)
//!     .map(|i| vec![(i % 2) as f64 * 5.0 + (i as f64 * 0.01), i as f64 * 0.1])
//!     .collect();
//! let labels: Vec<usize> = (0..60).map(|i| i % 2).collect();
//! let dataset = Dataset::new(features, labels)?;
//!
//! let result = SubspaceSweep::new(vec![1, 2])?
//!     .with_n_trials(3)
//!     .with_seed(42)
//!     .evaluate(&dataset)?;
//!
//! assert_eq!(result.points().len(), 2);
//! # Ok::<(), subspace_sweep::SweepError>(())
//! ```

mod dataset;
mod ensemble;
mod error;
mod metrics;
mod node;
mod split;
mod sweep;
mod tree;

pub use dataset::{Dataset, TrainTestSplit};
pub use ensemble::{Ensemble, EnsembleConfig, FeatureSubspace};
pub use error::SweepError;
pub use metrics::{accuracy, median};
pub use node::{Impurity, Node};
pub use split::SplitCriterion;
pub use sweep::{SubspaceSweep, SweepPoint, SweepResult};
pub use tree::{DecisionTree, DecisionTreeConfig};
