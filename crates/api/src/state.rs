use std::sync::Arc;

use deckgen_events::EventBus;
use deckgen_gemini::GeminiApi;
use deckgen_pipeline::{BatchOrchestrator, DeckStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.  Cheaply cloneable; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// In-memory deck repository (decks, pages, active-deck marker).
    pub store: Arc<DeckStore>,
    /// The batch generation orchestrator.
    pub orchestrator: Arc<BatchOrchestrator>,
    /// Provider client, used directly for the single-shot outline call.
    pub gemini: Arc<GeminiApi>,
    /// Generation event bus (forwarded to WebSocket clients).
    pub events: Arc<EventBus>,
}
