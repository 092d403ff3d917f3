//! Predictor over a loaded artifact bundle

use crate::artifacts::ArtifactBundle;
use crate::error::{PumpGuardError, Result};
use crate::health::HealthStatus;
use crate::sensor::SensorReading;
use crate::training::decision_tree::argmax;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Probability assigned to one status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub status: HealthStatus,
    pub probability: f64,
}

/// Classifier output for one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub status: HealthStatus,
    /// In `[0, 1]`; see [`Predictor::predict`]
    pub risk: f64,
    /// One entry per class the model knows, in class-index order
    pub probabilities: Vec<ClassProbability>,
}

/// Scales readings with the stored scaler and classifies them with the
/// stored forest. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: ArtifactBundle,
    statuses: Vec<HealthStatus>,
}

impl Predictor {
    /// Load the bundle from `dir`. Missing or inconsistent artifacts are an
    /// [`ArtifactError`](PumpGuardError::ArtifactError).
    pub fn load(dir: &Path) -> Result<Self> {
        Self::from_bundle(ArtifactBundle::load(dir)?)
    }

    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self> {
        bundle.validate()?;
        let statuses = bundle
            .model
            .classes()
            .iter()
            .map(|&c| {
                bundle.meta.label_map.status_of(c).ok_or_else(|| {
                    PumpGuardError::ArtifactError(format!("class index {} is not in the label map", c))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bundle, statuses })
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    /// Statuses the model can predict, aligned with its probability columns
    pub fn statuses(&self) -> &[HealthStatus] {
        &self.statuses
    }

    /// Classify one reading.
    ///
    /// The status is the most probable class (lowest index on ties). The risk
    /// is the probability of `CRITICAL` when the model knows more than two
    /// classes; otherwise it is the top probability.
    pub fn predict(&self, reading: &SensorReading) -> Result<Prediction> {
        let x = Array2::from_shape_vec((1, 3), reading.to_array().to_vec())?;
        let scaled = self.bundle.scaler.transform(&x)?;
        let proba = self.bundle.model.predict_proba_row(scaled.row(0))?;
        let prediction = self.interpret(&proba);
        debug!(status = %prediction.status, risk = prediction.risk, "Predicted");
        Ok(prediction)
    }

    /// Classify many readings at once
    pub fn predict_batch(&self, readings: &[SensorReading]) -> Result<Vec<Prediction>> {
        if readings.is_empty() {
            return Ok(Vec::new());
        }
        let flat: Vec<f64> = readings.iter().flat_map(|r| r.to_array()).collect();
        let x = Array2::from_shape_vec((readings.len(), 3), flat)?;
        let scaled = self.bundle.scaler.transform(&x)?;
        let proba = self.bundle.model.predict_proba(&scaled)?;
        Ok(proba.rows().into_iter().map(|row| self.interpret(&row.to_vec())).collect())
    }

    fn interpret(&self, proba: &[f64]) -> Prediction {
        let status = self.statuses[argmax(proba.iter().copied())];

        let risk = if self.statuses.len() > 2 {
            self.statuses
                .iter()
                .position(|&s| s == HealthStatus::Critical)
                .map(|i| proba[i])
                .unwrap_or(0.0)
        } else {
            proba.iter().copied().fold(0.0, f64::max)
        };

        Prediction {
            status,
            risk: risk.clamp(0.0, 1.0),
            probabilities: self
                .statuses
                .iter()
                .zip(proba)
                .map(|(&status, &probability)| ClassProbability { status, probability })
                .collect(),
        }
    }
}
