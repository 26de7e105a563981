//! Application State

use std::sync::Arc;
use std::time::Duration;

use tickr_core::{DEFAULT_SESSION_IDLE_TTL_SECS, DialogueRouter, MemorySessionStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Dialogue router, shared by every session
    pub router: Arc<DialogueRouter>,

    /// Live chat sessions, each owning its dialogue context
    pub sessions: Arc<MemorySessionStore>,

    /// Name of the active forecasting strategy, reported by `/health`
    pub strategy: &'static str,
}

impl AppState {
    pub fn new(router: DialogueRouter, strategy: &'static str) -> Self {
        Self::with_session_ttl(router, strategy, Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS))
    }

    /// State whose sessions are dropped after `idle_ttl` without a turn
    pub fn with_session_ttl(router: DialogueRouter, strategy: &'static str, idle_ttl: Duration) -> Self {
        Self {
            router: Arc::new(router),
            sessions: Arc::new(MemorySessionStore::with_idle_ttl(idle_ttl)),
            strategy,
        }
    }
}
