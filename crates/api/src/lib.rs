//! HTTP surface for the deckgen backend.
//!
//! Exposes deck management, outline acceptance/synthesis, and the full
//! batch-generation operation set over REST, plus a WebSocket endpoint
//! streaming generation events.  The canvas UI is a plain consumer of
//! this API.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod ws;

use axum::routing::get;
use axum::Router;

use state::AppState;

/// Assemble the application router (no middleware; `main` layers those).
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}
