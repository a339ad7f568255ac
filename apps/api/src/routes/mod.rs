pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analytics::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Pipeline analytics
        .route("/api/v1/pipeline/funnel", get(handlers::handle_funnel))
        .route(
            "/api/v1/pipeline/projection",
            post(handlers::handle_projection),
        )
        .route("/api/v1/pipeline/forecast", get(handlers::handle_forecast))
        .route("/api/v1/pipeline/scores", get(handlers::handle_scores))
        // Runtime signals and feature execution
        .route(
            "/api/v1/runtime/signals",
            get(handlers::handle_runtime_signals),
        )
        .route(
            "/api/v1/features/execution-package",
            post(handlers::handle_execution_package),
        )
        .with_state(state)
}
