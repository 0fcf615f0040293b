//! Accuracy scoring and trial aggregation helpers.

use crate::error::SweepError;

/// Fraction of positions where `predicted` equals `truth`.
///
/// # Errors
///
/// | Variant                             | When                          |
/// |-------------------------------------|-------------------------------|
/// | [`SweepError::EmptyDataset`]        | both slices are empty         |
/// | [`SweepError::ScoreLengthMismatch`] | the slices differ in length   |
pub fn accuracy(predicted: &[usize], truth: &[usize]) -> Result<f64, SweepError> {
    if predicted.len() != truth.len() {
        return Err(SweepError::ScoreLengthMismatch {
            n_predicted: predicted.len(),
            n_labels: truth.len(),
        });
    }
    if truth.is_empty() {
        return Err(SweepError::EmptyDataset);
    }
    let correct = predicted
        .iter()
        .zip(truth.iter())
        .filter(|&(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Median of a sequence of values.
///
/// Sorts a copy; for even lengths returns the mean of the two middle values.
/// Returns `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Index of the largest count, ties broken toward the lowest index.
///
/// This is the deterministic plurality-vote rule used both for leaf
/// predictions and for combining ensemble member votes.
pub(crate) fn plurality(counts: &[usize]) -> usize {
    let mut best_idx = 0;
    let mut best_count = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > best_count {
            best_idx = idx;
            best_count = count;
        }
    }
    best_idx
}
