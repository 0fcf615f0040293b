//! Split criteria and best-split search over random feature subspaces.

use rand::Rng;

use crate::node::Impurity;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Information entropy: -Σ(p_i · ln(p_i)). The sweep default.
    Entropy,
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns zero impurity when `n_samples` is zero (pure node).
    ///
    /// For `Entropy`: `-Σ(p_i · ln(p_i))` summed only over classes where `p_i > 0`.
    /// For `Gini`: `1 - Σ(p_i²)` where `p_i = count_i / n_samples`.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let value = match self {
            SplitCriterion::Entropy => {
                -class_counts
                    .iter()
                    .filter(|&&c| c > 0)
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p.ln()
                    })
                    .sum::<f64>()
            }
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
        };
        Impurity::new(value)
    }
}

/// The best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct CandidateSplit {
    /// Feature column used for the split.
    pub(crate) feature: usize,
    /// Threshold value: samples with feature <= threshold go left.
    pub(crate) threshold: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Choose `take` distinct feature columns uniformly at random.
///
/// Partial Fisher-Yates: only the first `take` positions are shuffled.
fn sample_feature_subspace(n_features: usize, take: usize, rng: &mut impl Rng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n_features).collect();
    let take = take.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

/// Scan one feature column for its best threshold.
///
/// Sorts the node's `(value, label)` pairs and walks candidate boundaries
/// between distinct adjacent values with incremental class-count updates.
/// Returns `(threshold, information_gain)` for the best boundary, or `None`
/// when the column is constant over the node's samples.
fn best_threshold(
    feat_col: &[f64],
    labels: &[usize],
    sample_indices: &[usize],
    parent_counts: &[usize],
    parent_impurity: Impurity,
    criterion: SplitCriterion,
) -> Option<(f64, f64)> {
    let n_samples = sample_indices.len();
    let n_classes = parent_counts.len();

    let mut sorted: Vec<(f64, usize)> = sample_indices
        .iter()
        .map(|&si| (feat_col[si], labels[si]))
        .collect();
    sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let mut left_counts = vec![0usize; n_classes];
    let mut right_counts = parent_counts.to_vec();

    let mut best: Option<(f64, f64)> = None;

    for i in 0..(n_samples - 1) {
        let (val, class) = sorted[i];
        left_counts[class] += 1;
        right_counts[class] -= 1;

        // A boundary only exists between distinct adjacent values.
        let val_next = sorted[i + 1].0;
        if val == val_next {
            continue;
        }

        let n_left = i + 1;
        let n_right = n_samples - n_left;
        let left_impurity = criterion.impurity(&left_counts, n_left);
        let right_impurity = criterion.impurity(&right_counts, n_right);

        let n = n_samples as f64;
        let gain = parent_impurity.value()
            - (n_left as f64 / n) * left_impurity.value()
            - (n_right as f64 / n) * right_impurity.value();

        if best.is_none_or(|(_, best_gain)| gain > best_gain) {
            best = Some(((val + val_next) / 2.0, gain));
        }
    }

    best
}

/// Find the best split for a node among a random subset of features.
///
/// Considers `subspace` randomly chosen feature columns (all columns when
/// `subspace == n_features`), scoring candidate thresholds by information
/// gain under `criterion`. Returns `None` when no feature admits a valid
/// boundary (all selected columns constant over the node's samples).
///
/// # Column-major layout
///
/// `col_features` is column-major: `col_features[feature_idx][sample_idx]`.
/// `sample_indices` index into the inner Vecs.
pub(crate) fn find_best_split(
    col_features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    subspace: usize,
    rng: &mut impl Rng,
) -> Option<CandidateSplit> {
    let n_features = col_features.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples);

    let selected = sample_feature_subspace(n_features, subspace, rng);

    let mut best: Option<(usize, f64, f64)> = None;
    for feat_idx in selected {
        if let Some((threshold, gain)) = best_threshold(
            &col_features[feat_idx],
            labels,
            sample_indices,
            &parent_counts,
            parent_impurity,
            criterion,
        ) && best.is_none_or(|(_, _, best_gain)| gain > best_gain)
        {
            best = Some((feat_idx, threshold, gain));
        }
    }

    let (feature, threshold, _) = best?;

    // Partition the node's samples by the winning threshold.
    let feat_col = &col_features[feature];
    let mut left_indices = Vec::with_capacity(n_samples / 2);
    let mut right_indices = Vec::with_capacity(n_samples / 2);
    for &si in sample_indices {
        if feat_col[si] <= threshold {
            left_indices.push(si);
        } else {
            right_indices.push(si);
        }
    }

    Some(CandidateSplit {
        feature,
        threshold,
        left_indices,
        right_indices,
    })
}
