// GET handlers. Every data route answers 200; a failed source shows up as a
// null/unknown field in the body, never as an HTTP error.

use axum::{Json, extract::State, response::IntoResponse};

use super::AppState;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/health: process liveness; never touches a collector.
pub(super) async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "version": VERSION,
    }))
}

pub(super) async fn system_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.system().await)
}

pub(super) async fn cpu_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.cpu().await)
}

pub(super) async fn memory_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.memory().await)
}

pub(super) async fn disk_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.disk().await)
}

pub(super) async fn docker_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.docker().await)
}

pub(super) async fn cloudflared_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.cloudflared().await)
}

pub(super) async fn services_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.services().await)
}

/// GET /api/all: full snapshot.
pub(super) async fn all_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.aggregator.collect().await)
}
