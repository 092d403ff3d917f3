//! Sensor readings and the fixed alarm limits shared by labeling and advice

use crate::error::{PumpGuardError, Result};
use serde::{Deserialize, Serialize};

/// Vibration above this (mm/s) counts toward severity
pub const VIBRATION_LIMIT: f64 = 6.0;
/// Temperature above this (°C) counts toward severity
pub const TEMPERATURE_LIMIT: f64 = 70.0;
/// Motor current above this (A) counts toward severity
pub const CURRENT_LIMIT: f64 = 12.0;

/// Canonical feature order used by the scaler, the model and the metadata
pub const FEATURE_NAMES: [&str; 3] = ["vibration", "temperature", "current"];

/// One set of pump measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Vibration velocity in mm/s
    pub vibration: f64,
    /// Casing temperature in °C
    pub temperature: f64,
    /// Motor current in A
    pub current: f64,
}

impl SensorReading {
    pub fn new(vibration: f64, temperature: f64, current: f64) -> Self {
        Self { vibration, temperature, current }
    }

    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; 3] {
        [self.vibration, self.temperature, self.current]
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [v, t, c] => Ok(Self::new(*v, *t, *c)),
            _ => Err(PumpGuardError::ShapeError {
                expected: "3 sensor values".to_string(),
                actual: format!("{} values", values.len()),
            }),
        }
    }

    /// Reject readings a physical sensor cannot produce.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in FEATURE_NAMES.iter().zip(self.to_array()) {
            if !value.is_finite() {
                return Err(PumpGuardError::InvalidInput(format!("{} must be a finite number", name)));
            }
            if value < 0.0 {
                return Err(PumpGuardError::InvalidInput(format!(
                    "{} must be >= 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn high_vibration(&self) -> bool {
        self.vibration > VIBRATION_LIMIT
    }

    pub fn high_temperature(&self) -> bool {
        self.temperature > TEMPERATURE_LIMIT
    }

    pub fn high_current(&self) -> bool {
        self.current > CURRENT_LIMIT
    }
}
