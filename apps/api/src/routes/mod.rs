pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers as match_handlers;
use crate::notify::handlers as notify_handlers;
use crate::pipeline::handlers as pipeline_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Client-facing match read (page-load path)
        .route("/api/v1/matches", get(match_handlers::handle_get_matches))
        // Fired by job ingestion on insert
        .route(
            "/api/v1/jobs/:id/match",
            post(pipeline_handlers::handle_job_match_trigger),
        )
        // Manual sweep trigger; the scheduler calls the same code path
        .route(
            "/api/v1/notifications/sweep",
            post(notify_handlers::handle_sweep_trigger),
        )
        .with_state(state)
}
