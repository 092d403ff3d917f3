//! Rule-based maintenance advice

use crate::sensor::SensorReading;

pub const ADVICE_VIBRATION: &str = "Inspect bearings & alignment (high vibration).";
pub const ADVICE_TEMPERATURE: &str = "Check lubrication & cooling system (overheating).";
pub const ADVICE_CURRENT: &str = "Inspect motor load or electrical faults (high current).";
pub const ADVICE_NONE: &str = "No immediate issues detected — continue monitoring.";

/// Recommendations for a reading, in the order vibration, temperature,
/// current. Never empty.
pub fn advise(reading: &SensorReading) -> Vec<String> {
    let mut advice: Vec<String> = [
        (reading.high_vibration(), ADVICE_VIBRATION),
        (reading.high_temperature(), ADVICE_TEMPERATURE),
        (reading.high_current(), ADVICE_CURRENT),
    ]
    .into_iter()
    .filter(|(triggered, _)| *triggered)
    .map(|(_, text)| text.to_string())
    .collect();

    if advice.is_empty() {
        advice.push(ADVICE_NONE.to_string());
    }
    advice
}
