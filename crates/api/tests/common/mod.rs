//! Shared helpers for HTTP-level handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use deckgen_api::config::ServerConfig;
use deckgen_api::state::AppState;
use deckgen_events::EventBus;
use deckgen_gemini::{GeminiApi, GeminiConfig};
use deckgen_pipeline::{BatchOrchestrator, DeckStore};
use deckgen_storage::FsImageStore;

/// Build the app against an in-memory store, a temp-dir image store, and
/// a provider client pointing nowhere (the tests below never make
/// provider calls).
pub fn build_test_app(storage_dir: &std::path::Path) -> (Router, AppState) {
    let gemini_config = GeminiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        image_model: "test-image-model".to_string(),
        text_model: "test-text-model".to_string(),
    };

    let store = Arc::new(DeckStore::new());
    let events = Arc::new(EventBus::default());
    let images = Arc::new(FsImageStore::new(storage_dir));
    let gemini = Arc::new(GeminiApi::new(gemini_config.clone()));
    let orchestrator = Arc::new(BatchOrchestrator::new(
        Arc::clone(&store),
        gemini.clone(),
        images,
        Arc::clone(&events),
    ));

    let mut config = ServerConfig::from_env();
    config.gemini = gemini_config;

    let state = AppState {
        config: Arc::new(config),
        store,
        orchestrator,
        gemini,
        events,
    };
    (deckgen_api::app(state.clone()), state)
}

pub async fn get(app: Router, uri: &str) -> Response<axum::body::Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request must build"),
    )
    .await
    .expect("request must not fail")
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> Response<axum::body::Body> {
    send_json(app, "POST", uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<axum::body::Body> {
    send_json(app, "POST", uri, None).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> Response<axum::body::Body> {
    send_json(app, "PUT", uri, Some(body)).await
}

async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<axum::body::Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request must build");

    app.oneshot(request).await.expect("request must not fail")
}

/// Collect and parse a JSON response body.
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body must collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be JSON")
}
