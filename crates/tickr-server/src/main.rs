//! TICKR HTTP Server
//!
//! Axum-based chat API in front of the stock forecasting dialogue. Each
//! session keeps its own dialogue context between requests.

mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stock_advisor::{AdvisorConfig, StockAdvisor};
use tickr_core::{DEFAULT_SESSION_IDLE_TTL_SECS, DialogueRouter};

use crate::handlers::{chat_handler, end_session, health_check};
use crate::state::AppState;

/// Routes and middleware around the given state
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/{id}", delete(end_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AdvisorConfig::from_env()?;
    let advisor = Arc::new(StockAdvisor::from_config(&config)?);
    let strategy = advisor.strategy_name();

    tracing::info!(%strategy, offline = config.offline, "✓ Forecast pipeline ready");

    let session_ttl = std::env::var("SESSION_IDLE_TTL_SECS")
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_SESSION_IDLE_TTL_SECS);
    tracing::info!(session_ttl_secs = session_ttl, "Idle sessions expire");

    let state = AppState::with_session_ttl(
        DialogueRouter::new(advisor),
        strategy,
        Duration::from_secs(session_ttl),
    );
    let app = build_router(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 tickr server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health             - Health check");
    tracing::info!("  POST   /api/chat           - Send message");
    tracing::info!("  DELETE /api/sessions/{{id}}  - End a session");

    axum::serve(listener, app).await?;

    Ok(())
}
