//! Integration test: loading a saved bundle and predicting

mod common;

use pumpguard::analysis::Analyzer;
use pumpguard::artifacts::{ArtifactBundle, META_FILE, MODEL_FILE, SCALER_FILE};
use pumpguard::error::PumpGuardError;
use pumpguard::health::HealthStatus;
use pumpguard::hypothesis::HypothesisGenerator;
use pumpguard::inference::Predictor;
use pumpguard::sensor::SensorReading;
use std::sync::Arc;

#[test]
fn test_load_and_predict() {
    let dir = tempfile::tempdir().unwrap();
    common::train_bundle(dir.path());
    let predictor = Predictor::load(&dir.path().join("model")).unwrap();

    assert_eq!(
        predictor.statuses(),
        &[HealthStatus::Healthy, HealthStatus::Warning, HealthStatus::Critical]
    );

    let healthy = predictor.predict(&SensorReading::new(2.1, 41.0, 8.1)).unwrap();
    assert_eq!(healthy.status, HealthStatus::Healthy);

    let critical = predictor.predict(&SensorReading::new(9.3, 88.0, 14.4)).unwrap();
    assert_eq!(critical.status, HealthStatus::Critical);
    // three classes: risk is the CRITICAL probability
    let p_critical = critical
        .probabilities
        .iter()
        .find(|p| p.status == HealthStatus::Critical)
        .map(|p| p.probability)
        .unwrap();
    assert_eq!(critical.risk, p_critical);

    let total: f64 = critical.probabilities.iter().map(|p| p.probability).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn test_batch_matches_single_predictions() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = common::train_bundle(dir.path());
    let predictor = Predictor::from_bundle(bundle).unwrap();

    let readings = vec![
        SensorReading::new(2.0, 40.0, 8.0),
        SensorReading::new(8.1, 45.0, 9.2),
        SensorReading::new(9.0, 85.0, 14.0),
    ];
    let batch = predictor.predict_batch(&readings).unwrap();
    assert_eq!(batch.len(), 3);
    for (reading, prediction) in readings.iter().zip(&batch) {
        assert_eq!(&predictor.predict(reading).unwrap(), prediction);
    }
}

#[test]
fn test_any_missing_file_fails_load() {
    for missing in [MODEL_FILE, SCALER_FILE, META_FILE] {
        let dir = tempfile::tempdir().unwrap();
        common::train_bundle(dir.path());
        let model_dir = dir.path().join("model");
        std::fs::remove_file(model_dir.join(missing)).unwrap();

        match Predictor::load(&model_dir) {
            Err(PumpGuardError::ArtifactError(msg)) => assert!(msg.contains(missing), "{}", msg),
            other => panic!("expected ArtifactError for {}, got {:?}", missing, other.map(|_| ())),
        }
    }
}

#[test]
fn test_corrupt_file_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    common::train_bundle(dir.path());
    let model_dir = dir.path().join("model");
    std::fs::write(model_dir.join(SCALER_FILE), "{ not json").unwrap();

    let err = ArtifactBundle::load(&model_dir).map(|_| ()).unwrap_err();
    assert!(matches!(err, PumpGuardError::ArtifactError(_)), "{:?}", err);
}

#[test]
fn test_feature_order_mismatch_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    common::train_bundle(dir.path());
    let model_dir = dir.path().join("model");
    std::fs::write(
        model_dir.join(META_FILE),
        r#"{"features":["temperature","vibration","current"],"label_map":{"HEALTHY":0,"WARNING":1,"CRITICAL":2}}"#,
    )
    .unwrap();

    let err = Predictor::load(&model_dir).map(|_| ()).unwrap_err();
    assert!(matches!(err, PumpGuardError::ArtifactError(_)), "{:?}", err);
}

#[test]
fn test_invalid_reading_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let predictor = Predictor::from_bundle(common::train_bundle(dir.path())).unwrap();
    let analyzer = Analyzer::new(Arc::new(predictor), HypothesisGenerator::disabled());
    let err = analyzer
        .evaluate(&SensorReading::new(f64::INFINITY, 40.0, 8.0))
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, PumpGuardError::InvalidInput(_)), "{:?}", err);
}
