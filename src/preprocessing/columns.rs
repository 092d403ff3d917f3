//! Column detection for loosely named sensor CSVs

use crate::error::{PumpGuardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic field a CSV column can be mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorField {
    Vibration,
    Temperature,
    Current,
    Label,
}

impl SensorField {
    pub const NUMERIC: [SensorField; 3] = [SensorField::Vibration, SensorField::Temperature, SensorField::Current];

    /// Candidate column names, most canonical first
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            SensorField::Vibration => &["vibration", "vib", "vibration_mm_s"],
            SensorField::Temperature => &["temperature", "temp", "temp_c"],
            SensorField::Current => &["current", "motor_current", "amps"],
            SensorField::Label => &["label", "status", "health", "class"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensorField::Vibration => "vibration",
            SensorField::Temperature => "temperature",
            SensorField::Current => "current",
            SensorField::Label => "label",
        }
    }
}

impl fmt::Display for SensorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Find the column matching a candidate list.
///
/// Pass 1 looks for a case-insensitive exact match, pass 2 for a candidate
/// contained in the column name. Within a pass the candidate order decides,
/// then the column order.
pub fn detect_column(columns: &[String], candidates: &[&str]) -> Option<String> {
    let lowered: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();

    let exact = candidates.iter().find_map(|cand| {
        let cand = cand.to_lowercase();
        lowered.iter().position(|col| *col == cand)
    });
    if let Some(idx) = exact {
        return Some(columns[idx].clone());
    }

    candidates
        .iter()
        .find_map(|cand| {
            let cand = cand.to_lowercase();
            lowered.iter().position(|col| col.contains(&cand))
        })
        .map(|idx| columns[idx].clone())
}

/// Resolved source columns for one training CSV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub vibration: String,
    pub temperature: String,
    pub current: String,
    /// `None` when labels have to be synthesized
    pub label: Option<String>,
}

impl ColumnMapping {
    /// Resolve every field, failing with a configuration error that names all
    /// unresolved numeric fields.
    pub fn detect(columns: &[String]) -> Result<Self> {
        let vibration = detect_column(columns, SensorField::Vibration.candidates());
        let temperature = detect_column(columns, SensorField::Temperature.candidates());
        let current = detect_column(columns, SensorField::Current.candidates());
        let label = detect_column(columns, SensorField::Label.candidates());

        match (vibration, temperature, current) {
            (Some(vibration), Some(temperature), Some(current)) => Ok(Self {
                vibration,
                temperature,
                current,
                label,
            }),
            (v, t, c) => {
                let missing: Vec<&str> = [
                    (SensorField::Vibration, v.is_none()),
                    (SensorField::Temperature, t.is_none()),
                    (SensorField::Current, c.is_none()),
                ]
                .iter()
                .filter(|(_, unresolved)| *unresolved)
                .map(|(field, _)| field.name())
                .collect();

                Err(PumpGuardError::ConfigError(format!(
                    "could not detect column(s) for: {} (available columns: {})",
                    missing.join(", "),
                    columns.join(", ")
                )))
            }
        }
    }

    /// Source column names of the numeric fields in feature order
    pub fn feature_columns(&self) -> [&str; 3] {
        [&self.vibration, &self.temperature, &self.current]
    }
}
