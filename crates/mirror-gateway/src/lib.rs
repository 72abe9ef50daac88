//! mirror-gateway: HTTP surface over the Soul Mirror orchestrator.

mod handlers;
pub mod logging;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use mirror_core::Orchestrator;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Full router: versioned API, legacy aliases, CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/process", get(handlers::process))
        .route("/api/v1/profile", get(handlers::profile))
        .route("/api/v1/tools", get(handlers::tools))
        .route("/api/v1/status", get(handlers::status))
        // Pre-v1 clients.
        .route("/process", get(handlers::legacy_process))
        .route("/profile", get(handlers::profile))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
