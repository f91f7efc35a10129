//! Route definitions for batch generation and per-page operations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/decks/{id}`.
///
/// Batch operations:
/// ```text
/// POST /{id}/generation/start     -> start (202, runs in background)
/// POST /{id}/generation/pause     -> pause
/// POST /{id}/generation/resume    -> resume (202, runs in background)
/// POST /{id}/generation/retry-all -> retry_all (202, runs in background)
/// ```
///
/// Per-page operations:
/// ```text
/// GET  /{id}/pages/{page_id}        -> get_page
/// POST /{id}/pages/{page_id}/run    -> run_one (202)
/// POST /{id}/pages/{page_id}/retry  -> retry_one (202)
/// POST /{id}/pages/{page_id}/stop   -> stop_one
/// POST /{id}/pages/{page_id}/skip   -> skip
/// POST /{id}/pages/{page_id}/manual -> upload_manual
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/decks/{id}/generation/start", post(generation::start))
        .route("/decks/{id}/generation/pause", post(generation::pause))
        .route("/decks/{id}/generation/resume", post(generation::resume))
        .route(
            "/decks/{id}/generation/retry-all",
            post(generation::retry_all),
        )
        .route("/decks/{id}/pages/{page_id}", get(generation::get_page))
        .route("/decks/{id}/pages/{page_id}/run", post(generation::run_one))
        .route(
            "/decks/{id}/pages/{page_id}/retry",
            post(generation::retry_one),
        )
        .route(
            "/decks/{id}/pages/{page_id}/stop",
            post(generation::stop_one),
        )
        .route("/decks/{id}/pages/{page_id}/skip", post(generation::skip))
        .route(
            "/decks/{id}/pages/{page_id}/manual",
            post(generation::upload_manual),
        )
}
