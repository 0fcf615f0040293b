//! Accuracy regression tests for subspace-sweep.
//!
//! These tests verify that algorithmic changes do not degrade ensemble
//! classification accuracy on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use subspace_sweep::{Dataset, EnsembleConfig, SubspaceSweep};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

/// Generate a 300-sample, 10-feature, 3-class classification dataset.
///
/// Features 0-2 are informative (class * 3.0 + noise in [0, 0.5]).
/// Features 3-9 are pure noise in [0, 0.5].
/// Samples are assigned round-robin across classes.
fn make_classification() -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 300;
    let n_features = 10;
    let n_classes = 3;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    Dataset::new(features, labels).unwrap()
}

// ---------------------------------------------------------------------------
// a) bagging_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// A 30-tree bagging ensemble must exceed 0.9 held-out accuracy on the
/// synthetic dataset.
///
/// Reference: observed accuracy ~1.0 with seed=42 — the informative
/// features separate the classes cleanly.
#[test]
fn bagging_accuracy_above_threshold() {
    let dataset = make_classification();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let split = dataset.split(0.2, &mut rng).unwrap();

    let ensemble = EnsembleConfig::bagging(30)
        .unwrap()
        .with_seed(42)
        .fit(&split.train_features, &split.train_labels)
        .unwrap();
    let acc = ensemble
        .score(&split.test_features, &split.test_labels)
        .unwrap();
    assert!(acc > 0.9, "bagging accuracy {acc} <= 0.9");
}

// ---------------------------------------------------------------------------
// b) subspace_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// A 30-tree random-subspace ensemble with m = 3 must exceed 0.8 held-out
/// accuracy on the synthetic dataset.
#[test]
fn subspace_accuracy_above_threshold() {
    let dataset = make_classification();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let split = dataset.split(0.2, &mut rng).unwrap();

    let ensemble = EnsembleConfig::random_subspace(30, 3)
        .unwrap()
        .with_seed(42)
        .fit(&split.train_features, &split.train_labels)
        .unwrap();
    let acc = ensemble
        .score(&split.test_features, &split.test_labels)
        .unwrap();
    assert!(acc > 0.8, "subspace accuracy {acc} <= 0.8");
}

// ---------------------------------------------------------------------------
// c) full_subspace_tracks_bagging
// ---------------------------------------------------------------------------

/// At m = n_features the subspace ensemble degenerates to bagging's
/// splitting behavior, so its median sweep accuracy must stay close to
/// bagging's.
#[test]
fn full_subspace_tracks_bagging() {
    let dataset = make_classification();
    let result = SubspaceSweep::new(vec![10])
        .unwrap()
        .with_n_trials(5)
        .with_n_trees(10)
        .with_seed(42)
        .evaluate(&dataset)
        .unwrap();

    let point = result.get(10).unwrap();
    let gap = (point.bagging_accuracy - point.subspace_accuracy).abs();
    assert!(
        gap < 0.1,
        "bagging {} vs full-subspace {} differ by {gap}",
        point.bagging_accuracy,
        point.subspace_accuracy
    );
}

// ---------------------------------------------------------------------------
// d) sweep_reproducible_across_runs
// ---------------------------------------------------------------------------

/// Two sweeps with identical inputs and identical seed must produce
/// identical median accuracies at every point.
#[test]
fn sweep_reproducible_across_runs() {
    let dataset = make_classification();
    let run = || {
        SubspaceSweep::new(vec![1, 3, 10])
            .unwrap()
            .with_n_trials(3)
            .with_n_trees(5)
            .with_seed(7)
            .evaluate(&dataset)
            .unwrap()
    };
    let r1 = run();
    let r2 = run();

    assert_eq!(r1.points().len(), r2.points().len());
    for (p1, p2) in r1.points().iter().zip(r2.points()) {
        assert_eq!(p1.m, p2.m);
        assert_eq!(p1.bagging_accuracy, p2.bagging_accuracy);
        assert_eq!(p1.subspace_accuracy, p2.subspace_accuracy);
    }
}

// ---------------------------------------------------------------------------
// e) sweep_accuracies_in_unit_interval
// ---------------------------------------------------------------------------

/// Every accuracy a sweep reports must lie in [0, 1], at every m including
/// the m = 1 and m = n_features extremes.
#[test]
fn sweep_accuracies_in_unit_interval() {
    let dataset = make_classification();
    let result = SubspaceSweep::new(vec![1, 5, 10])
        .unwrap()
        .with_n_trials(3)
        .with_n_trees(5)
        .with_seed(42)
        .evaluate(&dataset)
        .unwrap();

    for point in result.points() {
        assert!(
            (0.0..=1.0).contains(&point.bagging_accuracy),
            "m={}: bagging accuracy {} outside [0, 1]",
            point.m,
            point.bagging_accuracy
        );
        assert!(
            (0.0..=1.0).contains(&point.subspace_accuracy),
            "m={}: subspace accuracy {} outside [0, 1]",
            point.m,
            point.subspace_accuracy
        );
    }
}
