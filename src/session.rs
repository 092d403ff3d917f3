//! Per-user analysis history

use crate::error::Result;
use crate::health::HealthStatus;
use crate::sensor::SensorReading;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Column order of the exported CSV
pub const EXPORT_COLUMNS: [&str; 7] = [
    "timestamp",
    "vibration",
    "temperature",
    "current",
    "status",
    "risk",
    "hypothesis",
];

/// One completed analysis. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unix time in seconds
    pub timestamp: i64,
    pub vibration: f64,
    pub temperature: f64,
    pub current: f64,
    pub status: HealthStatus,
    pub risk: f64,
    pub hypothesis: String,
}

impl HistoryRecord {
    pub fn reading(&self) -> SensorReading {
        SensorReading::new(self.vibration, self.temperature, self.current)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct StatusCounts {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
}

impl StatusCounts {
    pub fn get(&self, status: HealthStatus) -> usize {
        match status {
            HealthStatus::Healthy => self.healthy,
            HealthStatus::Warning => self.warning,
            HealthStatus::Critical => self.critical,
        }
    }

    fn bump(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Warning => self.warning += 1,
            HealthStatus::Critical => self.critical += 1,
        }
    }
}

/// Aggregates behind the history dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total: usize,
    pub counts: StatusCounts,
    /// `None` for an empty history
    pub mean_risk: Option<f64>,
    pub max_risk: Option<f64>,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
}

/// History of one user's analyses. Owned by whoever serves that user; there
/// is no shared global history.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    records: Vec<HistoryRecord>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a record stamped with the current time
    pub fn record(
        &mut self,
        reading: &SensorReading,
        status: HealthStatus,
        risk: f64,
        hypothesis: impl Into<String>,
    ) -> &HistoryRecord {
        self.push(HistoryRecord {
            timestamp: Utc::now().timestamp(),
            vibration: reading.vibration,
            temperature: reading.temperature,
            current: reading.current,
            status,
            risk,
            hypothesis: hypothesis.into(),
        })
    }

    pub fn push(&mut self, record: HistoryRecord) -> &HistoryRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// All records in insertion order
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn records_with_status(&self, status: HealthStatus) -> Vec<&HistoryRecord> {
        self.records.iter().filter(|r| r.status == status).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn summary(&self) -> SessionSummary {
        let mut counts = StatusCounts::default();
        for r in &self.records {
            counts.bump(r.status);
        }
        let total = self.records.len();
        let (mean_risk, max_risk) = if total == 0 {
            (None, None)
        } else {
            let sum: f64 = self.records.iter().map(|r| r.risk).sum();
            let max = self.records.iter().map(|r| r.risk).fold(f64::NEG_INFINITY, f64::max);
            (Some(sum / total as f64), Some(max))
        };

        SessionSummary {
            total,
            counts,
            mean_risk,
            max_risk,
            first_timestamp: self.records.first().map(|r| r.timestamp),
            last_timestamp: self.records.last().map(|r| r.timestamp),
        }
    }

    /// History as a DataFrame with [`EXPORT_COLUMNS`]
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let r = &self.records;
        let columns: Vec<Column> = vec![
            Column::new(EXPORT_COLUMNS[0].into(), r.iter().map(|x| x.timestamp).collect::<Vec<i64>>()),
            Column::new(EXPORT_COLUMNS[1].into(), r.iter().map(|x| x.vibration).collect::<Vec<f64>>()),
            Column::new(EXPORT_COLUMNS[2].into(), r.iter().map(|x| x.temperature).collect::<Vec<f64>>()),
            Column::new(EXPORT_COLUMNS[3].into(), r.iter().map(|x| x.current).collect::<Vec<f64>>()),
            Column::new(
                EXPORT_COLUMNS[4].into(),
                r.iter().map(|x| x.status.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(EXPORT_COLUMNS[5].into(), r.iter().map(|x| x.risk).collect::<Vec<f64>>()),
            Column::new(
                EXPORT_COLUMNS[6].into(),
                r.iter().map(|x| x.hypothesis.as_str()).collect::<Vec<&str>>(),
            ),
        ];
        Ok(DataFrame::new(columns)?)
    }

    /// CSV with a header row and one row per record in insertion order
    pub fn export_csv(&self) -> Result<String> {
        let mut df = self.to_dataframe()?;
        let mut buf: Vec<u8> = Vec::new();
        CsvWriter::new(&mut buf).include_header(true).finish(&mut df)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: i64, status: HealthStatus, risk: f64) -> HistoryRecord {
        HistoryRecord {
            timestamp: ts,
            vibration: 7.5,
            temperature: 40.0,
            current: 6.0,
            status,
            risk,
            hypothesis: "bearing wear".to_string(),
        }
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let mut session = AnalysisSession::new();
        session.push(record(1, HealthStatus::Healthy, 0.1));
        session.push(record(2, HealthStatus::Critical, 0.9));
        session.push(record(3, HealthStatus::Healthy, 0.2));

        let ts: Vec<i64> = session.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(ts, vec![1, 2, 3]);
        assert_eq!(session.records_with_status(HealthStatus::Healthy).len(), 2);
        assert_eq!(session.records_with_status(HealthStatus::Warning).len(), 0);
    }

    #[test]
    fn test_record_stamps_current_time() {
        let mut session = AnalysisSession::new();
        let before = Utc::now().timestamp();
        let rec = session
            .record(&SensorReading::new(1.0, 2.0, 3.0), HealthStatus::Warning, 0.4, "text")
            .clone();
        assert!(rec.timestamp >= before);
        assert_eq!(rec.reading(), SensorReading::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_summary() {
        let mut session = AnalysisSession::new();
        assert_eq!(session.summary().mean_risk, None);

        session.push(record(10, HealthStatus::Healthy, 0.2));
        session.push(record(20, HealthStatus::Critical, 0.8));
        let summary = session.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.counts.get(HealthStatus::Critical), 1);
        assert_eq!(summary.max_risk, Some(0.8));
        assert!((summary.mean_risk.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(summary.first_timestamp, Some(10));
        assert_eq!(summary.last_timestamp, Some(20));
    }

    #[test]
    fn test_export_csv() {
        let mut session = AnalysisSession::new();
        session.push(record(1700000000, HealthStatus::Warning, 0.25));
        let csv = session.export_csv().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,vibration,temperature,current,status,risk,hypothesis")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("1700000000,7.5,"));
        assert!(row.contains("WARNING"));
        assert!(row.ends_with("bearing wear"));
    }

    #[test]
    fn test_export_after_clear_is_header_only() {
        let mut session = AnalysisSession::new();
        session.push(record(1, HealthStatus::Healthy, 0.1));
        session.clear();
        assert!(session.is_empty());

        let csv = session.export_csv().unwrap();
        assert_eq!(csv.trim_end(), "timestamp,vibration,temperature,current,status,risk,hypothesis");
    }

    #[test]
    fn test_summary_counts_serialize_uppercase() {
        let counts = StatusCounts {
            healthy: 1,
            warning: 2,
            critical: 3,
        };
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"HEALTHY":1,"WARNING":2,"CRITICAL":3}"#
        );
    }
}
