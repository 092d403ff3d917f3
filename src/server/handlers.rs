//! HTTP request handlers

use std::str::FromStr;
use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::advisor::advise;
use crate::analysis::AnalysisOutcome;
use crate::health::HealthStatus;
use crate::inference::Prediction;
use crate::sensor::SensorReading;
use crate::session::{HistoryRecord, SessionSummary};

use super::error::{Result, ServerError};
use super::state::{AppState, SharedSession};

/// File name offered for the history download
pub const EXPORT_FILE_NAME: &str = "pumpguard_history.csv";

fn parse_session_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServerError::BadRequest(format!("Invalid session id: {}", raw)))
}

fn parse_reading(payload: std::result::Result<Json<SensorReading>, JsonRejection>) -> Result<SensorReading> {
    payload
        .map(|Json(reading)| reading)
        .map_err(|e| ServerError::BadRequest(format!("Invalid reading: {}", e.body_text())))
}

async fn find_session(state: &AppState, raw_id: &str) -> Result<(Uuid, SharedSession)> {
    let id = parse_session_id(raw_id)?;
    let session = state
        .session(&id)
        .await
        .ok_or_else(|| ServerError::NotFound(format!("Session not found: {}", id)))?;
    Ok((id, session))
}

// ============================================================================
// System
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": true,
        "hypothesis_service": state.analyzer.hypotheses_enabled(),
        "sessions": state.session_count().await,
        "uptime_secs": (chrono::Utc::now() - state.started_at).num_seconds(),
    }))
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let predictor = state.analyzer.predictor();
    let bundle = predictor.bundle();
    let importances: Vec<serde_json::Value> = bundle
        .meta
        .features
        .iter()
        .zip(bundle.model.feature_importances().unwrap_or(&[]))
        .map(|(name, imp)| json!({ "feature": name, "importance": imp }))
        .collect();

    Json(json!({
        "features": bundle.meta.features,
        "label_map": bundle.meta.label_map,
        "classes": predictor.statuses(),
        "n_trees": bundle.model.n_trees(),
        "feature_importances": importances,
        "model_dir": state.config.model_dir.display().to_string(),
    }))
}

// ============================================================================
// Prediction
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub prediction: Prediction,
    pub recommendations: Vec<String>,
}

/// Stateless prediction: no hypothesis, nothing recorded
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SensorReading>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let reading = parse_reading(payload)?;
    let prediction = state.analyzer.evaluate(&reading)?;
    Ok(Json(PredictResponse {
        prediction,
        recommendations: advise(&reading),
    }))
}

// ============================================================================
// Sessions
// ============================================================================

pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (id, created_at) = state.create_session().await;
    info!(session = %id, "Session created");
    (
        StatusCode::CREATED,
        Json(json!({
            "id": id.to_string(),
            "created_at": created_at.to_rfc3339(),
        })),
    )
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_session_id(&session_id)?;
    if state.remove_session(&id).await {
        info!(session = %id, "Session deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::NotFound(format!("Session not found: {}", id)))
    }
}

/// Full analysis; appends one record to the session's history
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: std::result::Result<Json<SensorReading>, JsonRejection>,
) -> Result<Json<AnalysisOutcome>> {
    let reading = parse_reading(payload)?;
    let (_, session) = find_session(&state, &session_id).await?;
    let mut session = session.lock().await;
    let outcome = state.analyzer.analyze(&mut session, reading).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub count: usize,
    pub records: Vec<HistoryRecord>,
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>> {
    let filter = query
        .status
        .as_deref()
        .map(HealthStatus::from_str)
        .transpose()?;

    let (id, session) = find_session(&state, &session_id).await?;
    let session = session.lock().await;
    let records: Vec<HistoryRecord> = match filter {
        Some(status) => session.records_with_status(status).into_iter().cloned().collect(),
        None => session.records().to_vec(),
    };

    Ok(Json(HistoryResponse {
        session_id: id.to_string(),
        count: records.len(),
        records,
    }))
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let (id, session) = find_session(&state, &session_id).await?;
    let mut session = session.lock().await;
    let cleared = session.len();
    session.clear();
    info!(session = %id, cleared, "History cleared");
    Ok(Json(json!({ "cleared": cleared })))
}

pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>> {
    let (_, session) = find_session(&state, &session_id).await?;
    let summary = session.lock().await.summary();
    Ok(Json(summary))
}

pub async fn export_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse> {
    let (_, session) = find_session(&state, &session_id).await?;
    let csv = session.lock().await.export_csv()?;

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition)
                    .map_err(|e| ServerError::Internal(format!("Invalid header: {}", e)))?,
            ),
        ],
        csv,
    ))
}
