use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/workout/start", post(handlers::start_workout))
        .route("/workout/stop", post(handlers::stop_workout))
        .route("/workout/fix", post(handlers::push_fix))
        .route("/workout/live", get(handlers::live_stats))
        // Crash recovery
        .route("/checkpoint", get(handlers::get_checkpoint))
        .route("/checkpoint/resume", post(handlers::resume_checkpoint))
        .route("/checkpoint/discard", post(handlers::discard_checkpoint))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
