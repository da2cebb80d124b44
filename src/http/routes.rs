use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/monitor/start", post(handlers::start_monitoring))
        .route("/monitor/stop", post(handlers::stop_monitoring))
        // Session queries
        .route("/monitor/status", get(handlers::get_status))
        .route("/monitor/transcript", get(handlers::get_transcript))
        // Reporting
        .route("/monitor/report", post(handlers::send_report))
        // Browser dashboards talk to this API directly
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
