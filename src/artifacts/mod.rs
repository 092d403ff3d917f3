//! Persisted model bundle
//!
//! A trained model is three JSON files in one directory:
//! `pump_model.json`, `scaler.json` and `feature_meta.json`.

use crate::error::{PumpGuardError, Result};
use crate::health::LabelMap;
use crate::preprocessing::StandardScaler;
use crate::sensor::FEATURE_NAMES;
use crate::training::RandomForest;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const MODEL_FILE: &str = "pump_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const META_FILE: &str = "feature_meta.json";

/// Feature order and label vocabulary the model was trained with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMeta {
    pub features: Vec<String>,
    pub label_map: LabelMap,
}

impl Default for FeatureMeta {
    fn default() -> Self {
        Self {
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            label_map: LabelMap::canonical(),
        }
    }
}

/// Model, scaler and metadata as written by the trainer
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub model: RandomForest,
    pub scaler: StandardScaler,
    pub meta: FeatureMeta,
}

impl ArtifactBundle {
    pub fn new(model: RandomForest, scaler: StandardScaler) -> Self {
        Self {
            model,
            scaler,
            meta: FeatureMeta::default(),
        }
    }

    pub fn paths(dir: &Path) -> [PathBuf; 3] {
        [dir.join(MODEL_FILE), dir.join(SCALER_FILE), dir.join(META_FILE)]
    }

    /// Check that the three parts agree with each other and with the
    /// reading layout the predictor feeds them.
    pub fn validate(&self) -> Result<()> {
        if self.meta.features != FEATURE_NAMES {
            return Err(PumpGuardError::ArtifactError(format!(
                "feature metadata lists {:?}, expected {:?}",
                self.meta.features, FEATURE_NAMES
            )));
        }
        if !self.scaler.is_fitted() || self.scaler.n_features() != FEATURE_NAMES.len() {
            return Err(PumpGuardError::ArtifactError(format!(
                "scaler is fitted on {} feature(s), expected {}",
                self.scaler.n_features(),
                FEATURE_NAMES.len()
            )));
        }
        if !self.model.is_fitted() || self.model.n_features() != FEATURE_NAMES.len() {
            return Err(PumpGuardError::ArtifactError(format!(
                "model is fitted on {} feature(s), expected {}",
                self.model.n_features(),
                FEATURE_NAMES.len()
            )));
        }
        if let Some(unknown) = self
            .model
            .classes()
            .iter()
            .find(|&&c| self.meta.label_map.status_of(c).is_none())
        {
            return Err(PumpGuardError::ArtifactError(format!(
                "model predicts class index {} which is not in the label map",
                unknown
            )));
        }
        Ok(())
    }

    /// Write all three files. Each is serialized and written to a temporary
    /// file first. Any previous bundle is removed before the renames, so an
    /// interrupted save leaves files missing rather than a mix of old and new
    /// parts that would still load.
    pub fn save(&self, dir: &Path) -> Result<()> {
        self.validate()?;
        fs::create_dir_all(dir)?;

        let payloads = [
            serde_json::to_string(&self.model)?,
            serde_json::to_string_pretty(&self.scaler)?,
            serde_json::to_string_pretty(&self.meta)?,
        ];
        let targets = Self::paths(dir);
        let temps: Vec<PathBuf> = targets.iter().map(|p| p.with_extension("json.tmp")).collect();

        let committed = temps
            .iter()
            .zip(&payloads)
            .try_for_each(|(tmp, payload)| fs::write(tmp, payload))
            .and_then(|()| targets.iter().try_for_each(|p| remove_if_present(p)))
            .and_then(|()| {
                temps.iter().zip(&targets).try_for_each(|(tmp, target)| {
                    fs::rename(tmp, target)?;
                    debug!(path = %target.display(), "Wrote artifact");
                    Ok(())
                })
            });

        if let Err(e) = committed {
            for tmp in &temps {
                let _ = remove_if_present(tmp);
            }
            return Err(e.into());
        }

        info!(dir = %dir.display(), trees = self.model.n_trees(), "Saved model bundle");
        Ok(())
    }

    /// Read and validate a bundle. Any missing, unreadable or inconsistent
    /// file is an artifact error.
    pub fn load(dir: &Path) -> Result<Self> {
        let [model_path, scaler_path, meta_path] = Self::paths(dir);
        let bundle = Self {
            model: read_artifact(&model_path)?,
            scaler: read_artifact(&scaler_path)?,
            meta: read_artifact(&meta_path)?,
        };
        bundle.validate()?;
        info!(dir = %dir.display(), trees = bundle.model.n_trees(), "Loaded model bundle");
        Ok(bundle)
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path).map_err(|e| {
        PumpGuardError::ArtifactError(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&json)
        .map_err(|e| PumpGuardError::ArtifactError(format!("corrupt artifact {}: {}", path.display(), e)))
}
