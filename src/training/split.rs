//! Stratified train/test split

use crate::error::{PumpGuardError, Result};
use crate::health::HealthStatus;
use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Row indices of one split, each list in ascending order
#[derive(Debug, Clone, PartialEq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    pub fn select_rows(&self, x: &Array2<f64>) -> (Array2<f64>, Array2<f64>) {
        (x.select(Axis(0), &self.train), x.select(Axis(0), &self.test))
    }

    pub fn select_labels(&self, y: &[usize]) -> (Vec<usize>, Vec<usize>) {
        (
            self.train.iter().map(|&i| y[i]).collect(),
            self.test.iter().map(|&i| y[i]).collect(),
        )
    }
}

fn class_name(label: usize) -> String {
    HealthStatus::from_index(label)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("class {}", label))
}

/// Split so that every class keeps its proportion in both partitions.
///
/// Per class the test share is `round(test_size * count)` clamped to
/// `[1, count - 1]`. Classes are visited in ascending order and each class's
/// rows are shuffled with one generator seeded from `seed`, so the split is
/// reproducible. A class with fewer than two rows cannot be split.
pub fn stratified_split(labels: &[usize], test_size: f64, seed: u64) -> Result<SplitIndices> {
    if labels.is_empty() {
        return Err(PumpGuardError::InsufficientData("no rows to split".to_string()));
    }

    let mut class_indices: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        class_indices.entry(label).or_default().push(i);
    }

    if let Some((label, indices)) = class_indices.iter().find(|(_, idx)| idx.len() < 2) {
        return Err(PumpGuardError::InsufficientData(format!(
            "class {} has {} row(s); at least 2 are needed for a stratified split",
            class_name(*label),
            indices.len()
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for indices in class_indices.values_mut() {
        indices.shuffle(&mut rng);
        let count = indices.len();
        let n_test = ((count as f64 * test_size).round() as usize).clamp(1, count - 1);
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(SplitIndices { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(labels: &[usize], idx: &[usize], class: usize) -> usize {
        idx.iter().filter(|&&i| labels[i] == class).count()
    }

    #[test]
    fn test_split_keeps_class_proportions() {
        let mut labels = vec![0; 50];
        labels.extend(vec![1; 30]);
        labels.extend(vec![2; 20]);

        let split = stratified_split(&labels, 0.2, 42).unwrap();
        assert_eq!(split.train.len() + split.test.len(), 100);
        assert_eq!(count(&labels, &split.test, 0), 10);
        assert_eq!(count(&labels, &split.test, 1), 6);
        assert_eq!(count(&labels, &split.test, 2), 4);
    }

    #[test]
    fn test_split_is_disjoint_and_reproducible() {
        let labels: Vec<usize> = (0..40).map(|i| i % 3).collect();
        let a = stratified_split(&labels, 0.2, 42).unwrap();
        let b = stratified_split(&labels, 0.2, 42).unwrap();
        assert_eq!(a, b);
        assert!(a.test.iter().all(|i| !a.train.contains(i)));
    }

    #[test]
    fn test_small_classes_keep_one_row_each_side() {
        let labels = vec![0, 0, 1, 1, 1, 1, 1, 1, 1, 1];
        let split = stratified_split(&labels, 0.2, 0).unwrap();
        assert_eq!(count(&labels, &split.test, 0), 1);
        assert_eq!(count(&labels, &split.train, 0), 1);
    }

    #[test]
    fn test_singleton_class_is_insufficient() {
        let labels = vec![0, 0, 0, 2];
        match stratified_split(&labels, 0.2, 42) {
            Err(PumpGuardError::InsufficientData(msg)) => assert!(msg.contains("CRITICAL")),
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }
}
