//! Handlers for the `/decks` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use deckgen_core::deck::{Deck, StyleConfig};
use deckgen_core::outline::{self, OutlineEntry};
use deckgen_core::prompt::compose_outline_prompt;
use deckgen_core::types::DeckId;
use deckgen_pipeline::DeckSummary;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body for POST /decks.
#[derive(Debug, Deserialize)]
pub struct CreateDeck {
    pub title: String,
    /// Optional initial style; defaults apply when omitted.
    #[serde(default)]
    pub style: Option<StyleConfig>,
}

/// Body for POST /decks/{id}/outline/synthesize.
#[derive(Debug, Deserialize)]
pub struct SynthesizeOutline {
    pub topic: String,
    pub page_count: u32,
}

/// POST /api/v1/decks
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateDeck>,
) -> AppResult<(StatusCode, Json<Deck>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Deck title must not be empty".to_string()));
    }
    let deck = Deck::new(input.title, input.style.unwrap_or_default());
    let id = state.store.insert(deck);
    let deck = state.store.get(id)?;
    Ok((StatusCode::CREATED, Json(deck)))
}

/// GET /api/v1/decks
pub async fn list(State(state): State<AppState>) -> Json<Vec<DeckSummary>> {
    Json(state.store.list())
}

/// GET /api/v1/decks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<Json<Deck>> {
    Ok(Json(state.store.get(id)?))
}

/// DELETE /api/v1/decks/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<StatusCode> {
    state.store.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/decks/{id}/activate
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<StatusCode> {
    state.store.set_active(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/decks/{id}/style
pub async fn set_style(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
    Json(style): Json<StyleConfig>,
) -> AppResult<Json<Deck>> {
    state.store.patch(id, |deck| deck.style = style)?;
    Ok(Json(state.store.get(id)?))
}

/// PUT /api/v1/decks/{id}/outline
///
/// Accepts an explicit outline, replacing the deck's page set.  Existing
/// pages are matched by page number so their generation results survive.
pub async fn set_outline(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
    Json(entries): Json<Vec<OutlineEntry>>,
) -> AppResult<Json<Deck>> {
    // Replacing pages under an in-flight batch would orphan its jobs.
    crate::handlers::generation::ensure_not_running(&state, id)?;
    outline::validate_outline(&entries)?;
    state.store.patch(id, |deck| deck.replace_outline(entries))?;
    Ok(Json(state.store.get(id)?))
}

/// POST /api/v1/decks/{id}/outline/synthesize
///
/// One-shot LLM call producing the outline, then the same replacement
/// path as an explicit outline.
pub async fn synthesize_outline(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
    Json(input): Json<SynthesizeOutline>,
) -> AppResult<Json<Deck>> {
    if input.page_count == 0 {
        return Err(AppError::BadRequest("page_count must be at least 1".to_string()));
    }
    // Fail fast on unknown decks (and in-flight batches) before paying
    // for the provider call.
    crate::handlers::generation::ensure_not_running(&state, id)?;

    let prompt = compose_outline_prompt(&input.topic, input.page_count);
    let response = state
        .gemini
        .generate_text(&prompt, None, Some(outline::response_schema()))
        .await?;
    let entries = outline::parse_outline(&response)?;

    state.store.patch(id, |deck| deck.replace_outline(entries))?;
    Ok(Json(state.store.get(id)?))
}
