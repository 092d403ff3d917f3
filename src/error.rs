//! Error types for PumpGuard

use thiserror::Error;

/// Result type alias for PumpGuard operations
pub type Result<T> = std::result::Result<T, PumpGuardError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum PumpGuardError {
    /// Input cannot be mapped onto the expected schema (e.g. undetectable columns)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input data is malformed or contains values outside the label vocabulary
    #[error("Data error: {0}")]
    DataError(String),

    /// Not enough examples to perform a stratified split
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A persisted artifact is missing, unreadable, or inconsistent with the others
    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for PumpGuardError {
    fn from(err: polars::error::PolarsError) -> Self {
        PumpGuardError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PumpGuardError {
    fn from(err: serde_json::Error) -> Self {
        PumpGuardError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PumpGuardError {
    fn from(err: ndarray::ShapeError) -> Self {
        PumpGuardError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
