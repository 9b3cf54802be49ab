//! Route definitions for the API server

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Creates the main application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // Create CORS layer (the dashboard UI is served from another origin)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with routes
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Static information about the loaded datasets
        .route("/datasets", get(handlers::list_datasets))
        // Full report recomputation for an interval
        .route("/report", get(handlers::get_report))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}
