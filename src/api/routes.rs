//! API route definitions

use super::handlers::{self, OpsState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: OpsState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // ====================================================================
        // Plant map
        // ====================================================================
        .route("/api/map", get(handlers::get_map))
        // ====================================================================
        // Status requests
        // ====================================================================
        .route(
            "/api/map/requests",
            get(handlers::list_requests).post(handlers::submit_request),
        )
        .route("/api/map/requests/{request_id}", get(handlers::get_request))
        .route(
            "/api/map/requests/{request_id}/decision",
            post(handlers::decide_request),
        )
        // ====================================================================
        // Maintenance cycles
        // ====================================================================
        .route("/api/cycles/{task_type}", get(handlers::get_cycle_overview))
        .route(
            "/api/cycles/{task_type}/history",
            get(handlers::get_cycle_history),
        )
        .route(
            "/api/cycles/{task_type}/stats",
            get(handlers::get_cycle_stats),
        )
        .route("/api/cycles/{task_type}/reset", post(handlers::reset_cycle))
        // ====================================================================
        // Notifications
        // ====================================================================
        .route("/api/notifications", get(handlers::list_notifications))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
