//! Session Management
//!
//! A session is one conversation. It owns exactly one [`DialogueContext`],
//! which the router mutates once per turn and which is dropped with the
//! session. Nothing is shared between sessions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-conversation dialogue state
///
/// `awaiting_ticker == false` is the Idle state, `true` means the previous
/// turn asked the user for a ticker and the next utterance is that ticker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueContext {
    pub awaiting_ticker: bool,
}

impl DialogueContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        !self.awaiting_ticker
    }
}

/// A conversation session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Dialogue state, owned by this session only
    pub context: DialogueContext,

    /// Number of turns handled so far
    pub turns: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,

    /// Whether session is active
    pub active: bool,
}

impl Session {
    /// Create a new session in the Idle state
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            context: DialogueContext::new(),
            turns: 0,
            created_at: now,
            updated_at: now,
            active: true,
        }
    }

    /// Record that a turn was handled
    pub fn touch(&mut self) {
        self.turns += 1;
        self.updated_at = Utc::now();
    }

    /// End the session
    pub fn end(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Whether the last activity is more than `ttl` before `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.updated_at > ttl
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// A session guarded for the length of one turn
pub type SharedSession = Arc<Mutex<Session>>;

/// Session store trait
pub trait SessionStore: Send + Sync {
    /// Fetch a session, creating it if `id` is `None` or unknown
    fn open(&self, id: Option<&SessionId>) -> SharedSession;

    /// Look up an existing session
    fn get(&self, id: &SessionId) -> Option<SharedSession>;

    /// Remove a session, returning whether it existed
    fn end(&self, id: &SessionId) -> bool;

    /// Number of live sessions
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Idle time after which a session is dropped, in seconds
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 30 * 60;

/// In-memory session store
///
/// The map lock is only held to find or insert a session; a turn then locks
/// the session's own mutex, so turns of different sessions run independently.
///
/// Sessions idle for longer than the TTL are evicted whenever a session is
/// opened. A session whose mutex is held is mid-turn and never evicted.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SharedSession>>,
    idle_ttl: TimeDelta,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_idle_ttl(std::time::Duration::from_secs(DEFAULT_SESSION_IDLE_TTL_SECS))
    }

    pub fn with_idle_ttl(idle_ttl: std::time::Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl: TimeDelta::from_std(idle_ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Drop every session idle for longer than the TTL, returning how many
    pub fn evict_idle(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let before = sessions.len();
        sessions.retain(|_, shared| {
            !shared
                .try_lock()
                .is_ok_and(|session| session.is_expired(now, self.idle_ttl))
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, live = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }
}

impl SessionStore for MemorySessionStore {
    fn open(&self, id: Option<&SessionId>) -> SharedSession {
        self.evict_idle();
        if let Some(existing) = id.and_then(|id| self.get(id)) {
            return existing;
        }

        let session = Session::new();
        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(id.clone(), shared.clone());
        tracing::debug!(session = %id, "Session opened");
        shared
    }

    fn get(&self, id: &SessionId) -> Option<SharedSession> {
        self.sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn end(&self, id: &SessionId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(id);
        if removed.is_some() {
            tracing::debug!(session = %id, "Session ended");
        }
        removed.is_some()
    }

    fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
