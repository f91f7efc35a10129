//! Route definitions, grouped per resource.

pub mod decks;
pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(decks::router()).merge(generation::router())
}
