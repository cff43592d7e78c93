//! Stratified train/test split

use crate::error::{RiskError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of the two partitions, each in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Split rows so every class keeps its share in both partitions.
///
/// For each class the held-out count is `round(count * test_fraction)`,
/// clamped to `[1, count - 1]`; rows are shuffled with a seeded RNG before
/// the cut. Needs at least two classes with two rows each.
pub fn stratified_split(labels: &[usize], test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(RiskError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (row, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(row);
    }

    if by_class.len() < 2 {
        return Err(RiskError::TrainingError(format!(
            "target has {} distinct class(es); at least 2 are needed",
            by_class.len()
        )));
    }
    if let Some((class, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(RiskError::TrainingError(format!(
            "class {} has only {} row(s); each class needs at least 2 for a stratified split",
            class,
            rows.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(labels.len());
    let mut test_indices = Vec::new();

    for rows in by_class.values_mut() {
        rows.shuffle(&mut rng);
        let count = rows.len();
        let n_test = ((count as f64 * test_fraction).round() as usize).clamp(1, count - 1);
        test_indices.extend_from_slice(&rows[..n_test]);
        train_indices.extend_from_slice(&rows[n_test..]);
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}
