//! Router configuration.
//!
//! This module sets up all routes and middleware (compression, tracing) and
//! creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let api_v1 = Router::new().route("/compare", get(handlers::compare_json));

    Router::new()
        .route("/", get(handlers::compare_page))
        .route("/compare", get(handlers::compare_page))
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
