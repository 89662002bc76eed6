// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::Aggregator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) aggregator: Arc<Aggregator>,
}

pub fn app(aggregator: Arc<Aggregator>) -> Router {
    let state = AppState { aggregator };
    Router::new()
        .route("/", get(|| async { "Raspberry Pi Dashboard API" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/health", get(http::health_handler)) // GET /api/health
        .route("/api/system", get(http::system_handler)) // GET /api/system
        .route("/api/cpu", get(http::cpu_handler)) // GET /api/cpu
        .route("/api/memory", get(http::memory_handler)) // GET /api/memory
        .route("/api/disk", get(http::disk_handler)) // GET /api/disk
        .route("/api/docker", get(http::docker_handler)) // GET /api/docker
        .route("/api/cloudflared", get(http::cloudflared_handler)) // GET /api/cloudflared
        .route("/api/services", get(http::services_handler)) // GET /api/services
        .route("/api/all", get(http::all_handler)) // GET /api/all
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
