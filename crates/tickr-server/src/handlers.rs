//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use tickr_core::{SessionId, SessionStore};

use crate::state::AppState;

/// Longest accepted chat message, in bytes
const MAX_MESSAGE_LEN: usize = 2_000;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub strategy: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        strategy: state.strategy,
        sessions: state.sessions.len(),
    })
}

/// One dialogue turn
///
/// A missing or unknown `session_id` starts a new session. The session stays
/// locked for the whole turn, so concurrent requests for the same session
/// are handled one after the other.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.len() > MAX_MESSAGE_LEN {
        return Err(api_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Message exceeds {MAX_MESSAGE_LEN} bytes"),
            "MESSAGE_TOO_LONG",
        ));
    }

    let requested = payload.session_id.map(SessionId::from_string);
    let shared = state.sessions.open(requested.as_ref());
    let mut session = shared.lock().await;

    let reply = state
        .router
        .handle_turn(&payload.message, &mut session.context)
        .await;
    session.touch();

    tracing::debug!(
        session = %session.id,
        turns = session.turns,
        awaiting_ticker = session.context.awaiting_ticker,
        "Chat turn handled"
    );

    Ok(Json(ChatResponse {
        reply,
        session_id: session.id.to_string(),
    }))
}

/// End a session and discard its dialogue context
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from_string(id);
    if let Some(shared) = state.sessions.get(&id) {
        shared.lock().await.end();
    }

    if state.sessions.end(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Unknown session {id}"),
            "SESSION_NOT_FOUND",
        ))
    }
}
