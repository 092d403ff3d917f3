//! Application state management

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::analysis::Analyzer;
use crate::error::Result;
use crate::hypothesis::{HypothesisConfig, HypothesisGenerator};
use crate::inference::Predictor;
use crate::session::AnalysisSession;

use super::ServerConfig;

/// A session behind its own lock, so analyses of different sessions never
/// wait on each other
pub type SharedSession = Arc<Mutex<AnalysisSession>>;

/// A stored session and when it was last touched, in milliseconds since
/// the state was created
pub struct SessionEntry {
    pub session: SharedSession,
    last_used: AtomicU64,
}

impl SessionEntry {
    fn idle(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.last_used.load(Ordering::Relaxed)))
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub analyzer: Analyzer,
    pub sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    epoch: Instant,
}

impl AppState {
    /// Load the model bundle from `config.model_dir`. Fails if the bundle is
    /// missing or inconsistent; the server must not start without it.
    pub fn load(config: ServerConfig, hypothesis: &HypothesisConfig) -> Result<Self> {
        let predictor = Predictor::load(&config.model_dir)?;
        Ok(Self::new(config, predictor, HypothesisGenerator::new(hypothesis)))
    }

    pub fn new(config: ServerConfig, predictor: Predictor, hypotheses: HypothesisGenerator) -> Self {
        Self {
            config,
            analyzer: Analyzer::new(Arc::new(predictor), hypotheses),
            sessions: RwLock::new(HashMap::new()),
            started_at: chrono::Utc::now(),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.config.session_ttl_secs)
    }

    /// Create a session and return its id. Expired sessions are dropped
    /// first; at the session cap the least recently used one is evicted.
    pub async fn create_session(&self) -> (Uuid, chrono::DateTime<chrono::Utc>) {
        let session = AnalysisSession::new();
        let id = session.id();
        let created_at = session.created_at();
        let now = self.now_ms();

        let mut sessions = self.sessions.write().await;
        Self::drop_expired(&mut sessions, now, self.session_ttl());
        while sessions.len() >= self.config.max_sessions.max(1) {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    debug!(session = %oldest, "Evicted least recently used session");
                }
                None => break,
            }
        }
        sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                last_used: AtomicU64::new(now),
            },
        );
        (id, created_at)
    }

    /// Look up a live session and mark it as used. An expired session is
    /// reported as missing even before the next sweep removes it.
    pub async fn session(&self, id: &Uuid) -> Option<SharedSession> {
        let now = self.now_ms();
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        if entry.idle(now) > self.session_ttl() {
            return None;
        }
        entry.last_used.store(now, Ordering::Relaxed);
        Some(entry.session.clone())
    }

    pub async fn remove_session(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every session idle for longer than the configured TTL and
    /// return how many were removed
    pub async fn prune_expired(&self) -> usize {
        let now = self.now_ms();
        let mut sessions = self.sessions.write().await;
        Self::drop_expired(&mut sessions, now, self.session_ttl())
    }

    fn drop_expired(sessions: &mut HashMap<Uuid, SessionEntry>, now_ms: u64, ttl: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle(now_ms) <= ttl);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Dropped expired sessions");
        }
        removed
    }
}
