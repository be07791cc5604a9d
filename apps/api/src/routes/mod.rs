pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/v1/resumes/extract", post(handlers::handle_extract))
        .route("/api/v1/resumes/analyze", post(handlers::handle_analyze))
        .route("/api/v1/resumes/ats-score", post(handlers::handle_ats_score))
        .route(
            "/api/v1/resumes/ats-score/upload",
            post(handlers::handle_ats_score_upload),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
