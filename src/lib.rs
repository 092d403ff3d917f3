//! PumpGuard - predictive maintenance for industrial pumps
//!
//! This crate provides:
//! - Training-time data preparation: column detection, imputation, labels
//! - A seeded random forest classifier with a standard scaler
//! - Artifact persistence and a predictor over the saved bundle
//! - Natural-language hypotheses with a deterministic fallback
//! - Rule-based maintenance advice
//! - Per-session analysis history with CSV export
//! - HTTP server and CLI interfaces
//!
//! # Modules
//!
//! ## Domain
//! - [`sensor`] - Sensor readings and alarm limits
//! - [`health`] - Health statuses and the label map
//!
//! ## Training
//! - [`preprocessing`] - CSV ingestion, column detection, imputation, scaling
//! - [`training`] - Stratified split, decision trees, random forest, metrics
//! - [`artifacts`] - Model bundle persistence
//!
//! ## Analysis
//! - [`inference`] - Predictions from a loaded bundle
//! - [`hypothesis`] - Hypothesis generation and fallback
//! - [`advisor`] - Maintenance recommendations
//! - [`session`] - Analysis history
//! - [`analysis`] - The full per-reading analysis chain
//!
//! ## Services
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Domain types
pub mod health;
pub mod sensor;

// Training
pub mod preprocessing;
pub mod training;
pub mod artifacts;

// Analysis
pub mod inference;
pub mod hypothesis;
pub mod advisor;
pub mod session;
pub mod analysis;

// Services
pub mod server;
pub mod cli;

pub use error::{PumpGuardError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PumpGuardError, Result};

    // Domain
    pub use crate::health::{HealthStatus, LabelMap};
    pub use crate::sensor::{SensorReading, FEATURE_NAMES};

    // Training
    pub use crate::preprocessing::{load_and_prepare, ColumnMapping, PreparedData, StandardScaler};
    pub use crate::training::{ClassificationReport, RandomForest, Trainer, TrainingConfig};
    pub use crate::artifacts::ArtifactBundle;

    // Analysis
    pub use crate::inference::{Prediction, Predictor};
    pub use crate::hypothesis::{Hypothesis, HypothesisConfig, HypothesisGenerator};
    pub use crate::advisor::advise;
    pub use crate::session::{AnalysisSession, HistoryRecord, SessionSummary};
    pub use crate::analysis::{AnalysisOutcome, Analyzer};
}
