//! Route definitions for the `/decks` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::decks;
use crate::state::AppState;

/// Routes mounted at `/decks`.
///
/// ```text
/// POST   /                        -> create
/// GET    /                        -> list
/// GET    /{id}                    -> get_by_id
/// DELETE /{id}                    -> delete
/// POST   /{id}/activate           -> activate
/// PUT    /{id}/style              -> set_style
/// PUT    /{id}/outline            -> set_outline
/// POST   /{id}/outline/synthesize -> synthesize_outline
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/decks", post(decks::create).get(decks::list))
        .route("/decks/{id}", get(decks::get_by_id).delete(decks::delete))
        .route("/decks/{id}/activate", post(decks::activate))
        .route("/decks/{id}/style", put(decks::set_style))
        .route("/decks/{id}/outline", put(decks::set_outline))
        .route(
            "/decks/{id}/outline/synthesize",
            post(decks::synthesize_outline),
        )
}
