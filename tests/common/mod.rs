//! Shared fixtures for the integration tests

#![allow(dead_code)]

use pumpguard::artifacts::ArtifactBundle;
use pumpguard::training::{Trainer, TrainingConfig};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Three well separated operating regimes, `per_class` rows each, cycling
/// HEALTHY, WARNING, CRITICAL under the synthesized labeling rule.
pub fn sensor_rows(per_class: usize) -> Vec<(f64, f64, f64)> {
    (0..per_class * 3)
        .map(|i| {
            let jitter = (i % 7) as f64 * 0.1;
            match i % 3 {
                0 => (2.0 + jitter, 40.0 + jitter * 10.0, 8.0 + jitter),
                1 => (8.0 + jitter, 45.0 + jitter * 10.0, 9.0 + jitter),
                _ => (9.0 + jitter, 85.0 + jitter * 10.0, 14.0 + jitter),
            }
        })
        .collect()
}

/// Write an unlabeled CSV using abbreviated column names
pub fn write_unlabeled_csv(dir: &Path, per_class: usize) -> PathBuf {
    let mut body = String::from("timestamp,vib,temp,amps\n");
    for (i, (v, t, c)) in sensor_rows(per_class).into_iter().enumerate() {
        writeln!(body, "{},{},{},{}", i, v, t, c).unwrap();
    }
    let path = dir.join("unlabeled.csv");
    std::fs::write(&path, body).unwrap();
    path
}

/// Write a CSV with a free-form status column
pub fn write_labeled_csv(dir: &Path, per_class: usize) -> PathBuf {
    let names = ["ok", "Warning", "BAD"];
    let mut body = String::from("Vibration_mm_s,Temperature,Motor Current,Status\n");
    for (i, (v, t, c)) in sensor_rows(per_class).into_iter().enumerate() {
        writeln!(body, "{},{},{},{}", v, t, c, names[i % 3]).unwrap();
    }
    let path = dir.join("labeled.csv");
    std::fs::write(&path, body).unwrap();
    path
}

pub fn fast_trainer() -> Trainer {
    Trainer::new(TrainingConfig::new().with_n_estimators(25))
}

/// Train a small bundle from synthesized labels and save it into `dir`
pub fn train_bundle(dir: &Path) -> ArtifactBundle {
    let csv = write_unlabeled_csv(dir, 30);
    let out = dir.join("model");
    fast_trainer().train_csv(&csv, &out).unwrap().bundle
}
