//! Label synthesis and canonicalization

use crate::error::{PumpGuardError, Result};
use crate::health::HealthStatus;
use crate::sensor::SensorReading;
use std::collections::BTreeSet;

/// Maximum number of distinct offending values quoted in an error message
const MAX_REPORTED_LABELS: usize = 10;

/// Number of limits a reading exceeds, in `0..=3`
pub fn severity_score(reading: &SensorReading) -> u8 {
    reading.high_vibration() as u8 + reading.high_temperature() as u8 + reading.high_current() as u8
}

/// Rule-based label for a row without a recorded status.
pub fn synthesize_label(reading: &SensorReading) -> HealthStatus {
    HealthStatus::from_severity(severity_score(reading))
}

/// Synthesize one label per row. Rows are independent of each other.
pub fn synthesize_labels(readings: &[SensorReading]) -> Vec<HealthStatus> {
    readings.iter().map(synthesize_label).collect()
}

/// Canonicalize a label column. `None` entries are missing values.
///
/// Every value must map onto the vocabulary; otherwise the error lists the
/// distinct unrecognized values.
pub fn canonicalize_labels<'a, I>(raw: I) -> Result<Vec<HealthStatus>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut labels = Vec::new();
    let mut unrecognized: BTreeSet<String> = BTreeSet::new();

    for value in raw {
        match value.and_then(HealthStatus::canonicalize) {
            Some(status) => labels.push(status),
            None => {
                unrecognized.insert(value.map(str::to_string).unwrap_or_else(|| "<missing>".to_string()));
            }
        }
    }

    if unrecognized.is_empty() {
        return Ok(labels);
    }

    let total = unrecognized.len();
    let shown: Vec<String> = unrecognized.into_iter().take(MAX_REPORTED_LABELS).collect();
    let suffix = if total > MAX_REPORTED_LABELS {
        format!(" (and {} more)", total - MAX_REPORTED_LABELS)
    } else {
        String::new()
    };
    Err(PumpGuardError::DataError(format!(
        "unrecognized label value(s): {}{}; expected HEALTHY, WARNING, CRITICAL or OK/GOOD/BAD/FAIL",
        shown.join(", "),
        suffix
    )))
}
