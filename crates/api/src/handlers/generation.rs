//! Handlers for batch generation and per-page operations.
//!
//! Generation can run for minutes per page, so the launching operations
//! (`start`, `resume`, `retry-all`, `run`, `retry`) validate their
//! preconditions, spawn the orchestrator call, and answer `202 Accepted`;
//! progress flows to clients through the WebSocket event stream and the
//! deck read endpoints.  `pause`, `stop`, `skip`, and `manual` settle
//! quickly and are awaited inline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use deckgen_core::batch::GenerationStatus;
use deckgen_core::error::CoreError;
use deckgen_core::image::ImageData;
use deckgen_core::page::{Page, PageStatus};
use deckgen_core::types::{DeckId, PageId};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/decks/{id}/generation/start
pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<StatusCode> {
    ensure_not_running(&state, id)?;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.start(id).await {
            tracing::error!(deck_id = %id, error = %e, "Batch start failed");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/decks/{id}/generation/pause
pub async fn pause(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<StatusCode> {
    state.orchestrator.pause(id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/v1/decks/{id}/generation/resume
pub async fn resume(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<StatusCode> {
    ensure_not_running(&state, id)?;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.resume(id).await {
            tracing::error!(deck_id = %id, error = %e, "Batch resume failed");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/decks/{id}/generation/retry-all
pub async fn retry_all(
    State(state): State<AppState>,
    Path(id): Path<DeckId>,
) -> AppResult<StatusCode> {
    ensure_not_running(&state, id)?;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.retry_all(id).await {
            tracing::error!(deck_id = %id, error = %e, "Batch retry failed");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/decks/{id}/pages/{page_id}
pub async fn get_page(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(DeckId, PageId)>,
) -> AppResult<Json<Page>> {
    let page = read_page(&state, id, page_id)?;
    Ok(Json(page))
}

/// POST /api/v1/decks/{id}/pages/{page_id}/run
pub async fn run_one(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(DeckId, PageId)>,
) -> AppResult<StatusCode> {
    ensure_page_status(&state, id, page_id, &[PageStatus::Pending], "run")?;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.run_one(id, page_id).await {
            tracing::error!(deck_id = %id, page_id = %page_id, error = %e, "Page run failed");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/decks/{id}/pages/{page_id}/retry
pub async fn retry_one(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(DeckId, PageId)>,
) -> AppResult<StatusCode> {
    ensure_page_status(
        &state,
        id,
        page_id,
        &[PageStatus::Failed, PageStatus::Completed],
        "retry",
    )?;
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.retry_one(id, page_id).await {
            tracing::error!(deck_id = %id, page_id = %page_id, error = %e, "Page retry failed");
        }
    });
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/decks/{id}/pages/{page_id}/stop
pub async fn stop_one(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(DeckId, PageId)>,
) -> AppResult<Json<Page>> {
    state.orchestrator.stop_one(id, page_id).await?;
    let page = read_page(&state, id, page_id)?;
    Ok(Json(page))
}

/// POST /api/v1/decks/{id}/pages/{page_id}/skip
pub async fn skip(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(DeckId, PageId)>,
) -> AppResult<Json<Page>> {
    state.orchestrator.skip(id, page_id)?;
    let page = read_page(&state, id, page_id)?;
    Ok(Json(page))
}

/// POST /api/v1/decks/{id}/pages/{page_id}/manual
pub async fn upload_manual(
    State(state): State<AppState>,
    Path((id, page_id)): Path<(DeckId, PageId)>,
    Json(image): Json<ImageData>,
) -> AppResult<Json<Page>> {
    state.orchestrator.upload_manual(id, page_id, image)?;
    let page = read_page(&state, id, page_id)?;
    Ok(Json(page))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject launching a new run while one is already in progress.  The
/// orchestrator re-checks atomically; this check only exists so callers
/// get a 409 instead of a silently failing background task.
pub(crate) fn ensure_not_running(state: &AppState, id: DeckId) -> AppResult<()> {
    let status = state.store.read(id, |deck| deck.generation_status)?;
    if status == GenerationStatus::Running {
        return Err(AppError::Core(CoreError::Conflict(
            "A generation run is already in progress for this deck".to_string(),
        )));
    }
    Ok(())
}

/// Reject single-page launches whose page is not in an accepted status.
fn ensure_page_status(
    state: &AppState,
    id: DeckId,
    page_id: PageId,
    allowed: &[PageStatus],
    operation: &str,
) -> AppResult<()> {
    let page = read_page(state, id, page_id)?;
    if !allowed.contains(&page.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot {operation} page {}: it is {}",
            page.page_number,
            page.status.label(),
        ))));
    }
    Ok(())
}

fn read_page(state: &AppState, id: DeckId, page_id: PageId) -> Result<Page, CoreError> {
    state.store.read(id, |deck| {
        deck.page(page_id)
            .cloned()
            .ok_or(CoreError::NotFound { entity: "Page", id: page_id })
    })?
}
