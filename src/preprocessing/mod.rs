//! Training-time data preparation
//!
//! - Column detection for arbitrarily named sensor CSVs
//! - Median imputation of missing numeric values
//! - Label canonicalization, or rule-based synthesis when no label column exists
//! - Standard feature scaling

mod columns;
mod imputer;
mod labels;
mod scaler;

pub use columns::{detect_column, ColumnMapping, SensorField};
pub use imputer::{impute_median, median, ImputedColumn};
pub use labels::{canonicalize_labels, severity_score, synthesize_label, synthesize_labels};
pub use scaler::{ScalerParams, StandardScaler};

use crate::error::{PumpGuardError, Result};
use crate::health::HealthStatus;
use crate::sensor::{SensorReading, FEATURE_NAMES};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Where the training labels came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabelSource {
    /// Read and canonicalized from the named column
    Column(String),
    /// Derived from the sensor limits
    Synthesized,
}

/// Features and labels ready for the trainer
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// n × 3 matrix in [`FEATURE_NAMES`] order
    pub features: Array2<f64>,
    pub labels: Vec<HealthStatus>,
    pub mapping: ColumnMapping,
    pub label_source: LabelSource,
    /// Missing values filled per feature, in [`FEATURE_NAMES`] order
    pub imputed_counts: [usize; 3],
}

impl PreparedData {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    /// Rows per status, in class-index order
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    pub fn label_indices(&self) -> Vec<usize> {
        self.labels.iter().map(|l| l.index()).collect()
    }
}

/// Read a CSV with a header row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| PumpGuardError::DataError(format!("cannot open {}: {}", path.display(), e)))?
        .finish()
        .map_err(|e| PumpGuardError::DataError(format!("cannot parse {}: {}", path.display(), e)))?;
    Ok(df)
}

/// Detect columns, impute, and resolve labels for a raw frame
pub fn prepare_frame(df: &DataFrame) -> Result<PreparedData> {
    let columns: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let mapping = ColumnMapping::detect(&columns)?;
    info!(
        vibration = %mapping.vibration,
        temperature = %mapping.temperature,
        current = %mapping.current,
        label = mapping.label.as_deref().unwrap_or("<none>"),
        "Detected columns"
    );

    if df.height() == 0 {
        return Err(PumpGuardError::InsufficientData("input has no rows".to_string()));
    }

    let mut imputed_counts = [0usize; 3];
    let mut feature_columns: Vec<Vec<f64>> = Vec::with_capacity(3);
    for (i, source) in mapping.feature_columns().iter().enumerate() {
        let column = df
            .column(source)
            .map_err(|_| PumpGuardError::ConfigError(format!("column '{}' not found", source)))?;
        let imputed = impute_median(column)?;
        if imputed.n_filled > 0 {
            debug!(
                feature = FEATURE_NAMES[i],
                filled = imputed.n_filled,
                median = imputed.fill_value,
                "Imputed missing values"
            );
        }
        imputed_counts[i] = imputed.n_filled;
        feature_columns.push(imputed.values);
    }

    let n_rows = df.height();
    let features = Array2::from_shape_fn((n_rows, 3), |(r, c)| feature_columns[c][r]);

    let (labels, label_source) = match &mapping.label {
        Some(label_col) => {
            let column = df
                .column(label_col)
                .map_err(|_| PumpGuardError::ConfigError(format!("column '{}' not found", label_col)))?;
            let as_str = column.as_materialized_series().cast(&DataType::String)?;
            let ca = as_str.str()?;
            let labels = canonicalize_labels(ca.into_iter())?;
            (labels, LabelSource::Column(label_col.clone()))
        }
        None => {
            let readings: Vec<SensorReading> = features
                .rows()
                .into_iter()
                .map(|row| SensorReading::new(row[0], row[1], row[2]))
                .collect();
            (synthesize_labels(&readings), LabelSource::Synthesized)
        }
    };

    Ok(PreparedData {
        features,
        labels,
        mapping,
        label_source,
        imputed_counts,
    })
}

/// Load and prepare a training CSV in one step
pub fn load_and_prepare(path: &Path) -> Result<PreparedData> {
    let df = load_csv(path)?;
    info!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded training data");
    prepare_frame(&df)
}
