//! PumpGuard HTTP server
//!
//! REST API over a loaded model bundle: stateless predictions plus
//! per-session analyses with history, summary and CSV export.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::EXPORT_FILE_NAME;
pub use state::{AppState, SessionEntry, SharedSession};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::hypothesis::HypothesisConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the artifact bundle
    pub model_dir: PathBuf,
    /// Sessions idle longer than this are dropped
    pub session_ttl_secs: u64,
    /// Creating a session beyond this evicts the least recently used one
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            model_dir: std::env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("model")),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            max_sessions: std::env::var("MAX_SESSIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
        }
    }
}

/// Start the server with the given configuration.
///
/// The model bundle is loaded before binding; a missing or inconsistent
/// bundle aborts startup.
pub async fn run_server(config: ServerConfig, hypothesis: HypothesisConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model_dir = %config.model_dir.display(),
        started_at = %start_time.to_rfc3339(),
        "Loading model bundle"
    );

    let state = Arc::new(AppState::load(config.clone(), &hypothesis)?);
    info!(
        hypothesis_service = state.analyzer.hypotheses_enabled(),
        model = %hypothesis.model,
        "Hypothesis generator ready"
    );

    let sweeper = {
        let state = state.clone();
        let period = Duration::from_secs(config.session_ttl_secs.clamp(1, 60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let removed = state.prune_expired().await;
                if removed > 0 {
                    debug!(removed, "Session sweep");
                }
            }
        })
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        "PumpGuard server starting"
    );
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    // Graceful shutdown on ctrl+c
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c, serving until killed");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    sweeper.abort();
    info!("Server shut down cleanly");
    Ok(())
}
