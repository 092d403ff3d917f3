//! Health status vocabulary and the persisted label ↔ index mapping

use crate::error::{PumpGuardError, Result};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Pump health class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// All statuses in class-index order
    pub const ALL: [HealthStatus; 3] = [HealthStatus::Healthy, HealthStatus::Warning, HealthStatus::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Warning => "WARNING",
            HealthStatus::Critical => "CRITICAL",
        }
    }

    /// Class index used by the classifier
    pub fn index(&self) -> usize {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Warning => 1,
            HealthStatus::Critical => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Map a count of exceeded limits to a status: 0 → HEALTHY, 1 → WARNING, 2+ → CRITICAL
    pub fn from_severity(score: u8) -> Self {
        match score {
            0 => HealthStatus::Healthy,
            1 => HealthStatus::Warning,
            _ => HealthStatus::Critical,
        }
    }

    /// Uppercase a free-form label and fold the known synonyms onto the
    /// canonical names. Returns `None` for anything outside the vocabulary.
    pub fn canonicalize(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "HEALTHY" | "OK" | "GOOD" => Some(HealthStatus::Healthy),
            "WARNING" => Some(HealthStatus::Warning),
            "CRITICAL" | "BAD" | "FAIL" => Some(HealthStatus::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = PumpGuardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PumpGuardError::InvalidInput(format!("unknown health status: {}", s)))
    }
}

/// Fixed bijection between status names and class indices.
///
/// Serialized as `{"HEALTHY":0,"WARNING":1,"CRITICAL":2}` (in index order).
/// Deserialization only accepts that exact mapping, so a bundle with a
/// different vocabulary fails to load instead of mislabeling predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelMap;

impl LabelMap {
    pub fn canonical() -> Self {
        LabelMap
    }

    pub fn index_of(&self, status: HealthStatus) -> usize {
        status.index()
    }

    pub fn status_of(&self, index: usize) -> Option<HealthStatus> {
        HealthStatus::from_index(index)
    }

    /// `(name, index)` pairs in index order
    pub fn entries(&self) -> impl Iterator<Item = (HealthStatus, usize)> {
        HealthStatus::ALL.into_iter().map(|s| (s, s.index()))
    }

    pub fn len(&self) -> usize {
        HealthStatus::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Serialize for LabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (status, index) in self.entries() {
            map.serialize_entry(status.as_str(), &index)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LabelMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw: BTreeMap<String, usize> = BTreeMap::deserialize(deserializer)?;
        if raw.len() != HealthStatus::ALL.len() {
            return Err(de::Error::custom(format!(
                "label_map must have {} entries, found {}",
                HealthStatus::ALL.len(),
                raw.len()
            )));
        }
        for status in HealthStatus::ALL {
            match raw.get(status.as_str()) {
                Some(&index) if index == status.index() => {}
                Some(&index) => {
                    return Err(de::Error::custom(format!(
                        "label_map maps {} to {}, expected {}",
                        status,
                        index,
                        status.index()
                    )))
                }
                None => return Err(de::Error::custom(format!("label_map is missing {}", status))),
            }
        }
        Ok(LabelMap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let map = LabelMap::canonical();
        for status in HealthStatus::ALL {
            let idx = map.index_of(status);
            assert_eq!(map.status_of(idx), Some(status));
        }
        for idx in 0..3 {
            assert_eq!(map.index_of(map.status_of(idx).unwrap()), idx);
        }
        assert_eq!(map.status_of(3), None);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(HealthStatus::from_severity(0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_severity(1), HealthStatus::Warning);
        assert_eq!(HealthStatus::from_severity(2), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_severity(3), HealthStatus::Critical);
    }

    #[test]
    fn test_canonicalize_synonyms() {
        assert_eq!(HealthStatus::canonicalize("ok"), Some(HealthStatus::Healthy));
        assert_eq!(HealthStatus::canonicalize("Good"), Some(HealthStatus::Healthy));
        assert_eq!(HealthStatus::canonicalize("healthy"), Some(HealthStatus::Healthy));
        assert_eq!(HealthStatus::canonicalize("warning"), Some(HealthStatus::Warning));
        assert_eq!(HealthStatus::canonicalize("bad"), Some(HealthStatus::Critical));
        assert_eq!(HealthStatus::canonicalize("FAIL"), Some(HealthStatus::Critical));
        assert_eq!(HealthStatus::canonicalize("broken"), None);
        assert_eq!(HealthStatus::canonicalize(""), None);
    }

    #[test]
    fn test_label_map_json_layout() {
        let json = serde_json::to_string(&LabelMap::canonical()).unwrap();
        assert_eq!(json, r#"{"HEALTHY":0,"WARNING":1,"CRITICAL":2}"#);
        let back: LabelMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LabelMap::canonical());
    }

    #[test]
    fn test_label_map_rejects_other_mappings() {
        assert!(serde_json::from_str::<LabelMap>(r#"{"HEALTHY":1,"WARNING":0,"CRITICAL":2}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"{"HEALTHY":0,"WARNING":1}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"{"HEALTHY":0,"WARNING":1,"BROKEN":2}"#).is_err());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&HealthStatus::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!("warning".parse::<HealthStatus>().unwrap(), HealthStatus::Warning);
    }
}
