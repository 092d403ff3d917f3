//! Training engine: split, scale, fit, evaluate, persist

use super::metrics::ClassificationReport;
use super::random_forest::RandomForest;
use super::split::stratified_split;
use super::TrainingConfig;
use crate::artifacts::ArtifactBundle;
use crate::error::Result;
use crate::preprocessing::{load_and_prepare, ColumnMapping, LabelSource, PreparedData, StandardScaler};
use crate::sensor::FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Facts about a finished run, for the CLI report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// Rows per status in class-index order
    pub class_counts: [usize; 3],
    pub mapping: ColumnMapping,
    pub label_source: LabelSource,
    pub imputed_counts: [usize; 3],
    /// `(feature, importance)` in feature order
    pub feature_importances: Vec<(String, f64)>,
    pub training_time_secs: f64,
}

/// Output of [`Trainer::fit`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    pub report: ClassificationReport,
    pub summary: TrainingSummary,
}

/// Trains the scaler and forest for one prepared dataset
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Split, fit the scaler on the train rows only, fit the forest on the
    /// scaled train rows and evaluate on the scaled test rows.
    pub fn fit(&self, data: &PreparedData) -> Result<TrainingOutcome> {
        self.config.validate()?;
        let start = Instant::now();

        let y = data.label_indices();
        let split = stratified_split(&y, self.config.test_size, self.config.random_state)?;
        let (x_train, x_test) = split.select_rows(&data.features);
        let (y_train, y_test) = split.select_labels(&y);
        info!(train = y_train.len(), test = y_test.len(), "Stratified split");

        let mut scaler = StandardScaler::new();
        let x_train = scaler.fit_transform(&x_train)?;
        let x_test = scaler.transform(&x_test)?;

        let mut model = RandomForest::new(self.config.n_estimators)
            .with_criterion(self.config.criterion)
            .with_max_features(self.config.max_features)
            .with_min_samples_leaf(self.config.min_samples_leaf)
            .with_random_state(self.config.random_state);
        if let Some(depth) = self.config.max_depth {
            model = model.with_max_depth(depth);
        }
        model.fit(&x_train, &y_train)?;

        let proba = model.predict_proba(&x_test)?;
        let y_pred = model.predict(&x_test)?;
        let report = ClassificationReport::compute(&y_test, &y_pred, &proba, model.classes());

        let training_time_secs = start.elapsed().as_secs_f64();
        info!(
            trees = model.n_trees(),
            accuracy = report.accuracy,
            secs = training_time_secs,
            "Model trained"
        );

        let feature_importances = FEATURE_NAMES
            .iter()
            .zip(model.feature_importances().unwrap_or(&[]))
            .map(|(name, imp)| (name.to_string(), *imp))
            .collect();

        let summary = TrainingSummary {
            n_rows: data.n_rows(),
            n_train: y_train.len(),
            n_test: y_test.len(),
            class_counts: data.class_counts(),
            mapping: data.mapping.clone(),
            label_source: data.label_source.clone(),
            imputed_counts: data.imputed_counts,
            feature_importances,
            training_time_secs,
        };

        Ok(TrainingOutcome {
            bundle: ArtifactBundle::new(model, scaler),
            report,
            summary,
        })
    }

    /// Load a CSV, train, and write the bundle into `out_dir`.
    ///
    /// Nothing is written unless every earlier step succeeded.
    pub fn train_csv(&self, csv: &Path, out_dir: &Path) -> Result<TrainingOutcome> {
        let data = load_and_prepare(csv)?;
        let outcome = self.fit(&data)?;
        outcome.bundle.save(out_dir)?;
        Ok(outcome)
    }
}
