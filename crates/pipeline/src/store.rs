//! In-memory deck repository.
//!
//! Holds every open deck and tracks which one is active (displayed).
//! All mutations go through [`DeckStore::patch`], a read-modify-write
//! over the current stored value executed under a single write lock:
//! several pages completing in the same tick each see the deck state
//! left by the previous completion, and progress is recomputed inside
//! the same critical section.  Closures must not block or await.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use deckgen_core::batch::{GenerationStatus, Progress};
use deckgen_core::deck::Deck;
use deckgen_core::error::CoreError;
use deckgen_core::types::{DeckId, Timestamp};

/// Lightweight listing row for a deck.
#[derive(Debug, Clone, Serialize)]
pub struct DeckSummary {
    pub id: DeckId,
    pub title: String,
    pub generation_status: GenerationStatus,
    pub progress: Progress,
    pub page_count: usize,
    pub created_at: Timestamp,
}

#[derive(Default)]
struct Inner {
    decks: HashMap<DeckId, Deck>,
    active: Option<DeckId>,
}

/// Shared in-memory store of decks, plus the active-deck marker.
#[derive(Default)]
pub struct DeckStore {
    inner: RwLock<Inner>,
}

impl DeckStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a deck.  The first deck inserted becomes the active one.
    pub fn insert(&self, deck: Deck) -> DeckId {
        let id = deck.id;
        let mut inner = self.write_lock();
        inner.decks.insert(id, deck);
        if inner.active.is_none() {
            inner.active = Some(id);
        }
        id
    }

    /// Remove a deck.  Clears the active marker if it pointed here.
    pub fn remove(&self, id: DeckId) -> Result<(), CoreError> {
        let mut inner = self.write_lock();
        if inner.decks.remove(&id).is_none() {
            return Err(CoreError::NotFound { entity: "Deck", id });
        }
        if inner.active == Some(id) {
            inner.active = inner.decks.keys().next().copied();
        }
        Ok(())
    }

    /// Clone the full deck state.
    pub fn get(&self, id: DeckId) -> Result<Deck, CoreError> {
        self.read_lock()
            .decks
            .get(&id)
            .cloned()
            .ok_or(CoreError::NotFound { entity: "Deck", id })
    }

    /// List all decks, most recently created first.
    pub fn list(&self) -> Vec<DeckSummary> {
        let inner = self.read_lock();
        let mut summaries: Vec<DeckSummary> = inner
            .decks
            .values()
            .map(|deck| DeckSummary {
                id: deck.id,
                title: deck.title.clone(),
                generation_status: deck.generation_status,
                progress: deck.progress,
                page_count: deck.pages.len(),
                created_at: deck.created_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries
    }

    /// Mark a deck as the active (displayed) one.
    pub fn set_active(&self, id: DeckId) -> Result<(), CoreError> {
        let mut inner = self.write_lock();
        if !inner.decks.contains_key(&id) {
            return Err(CoreError::NotFound { entity: "Deck", id });
        }
        inner.active = Some(id);
        Ok(())
    }

    /// The currently active deck, if any.
    pub fn active_deck_id(&self) -> Option<DeckId> {
        self.read_lock().active
    }

    /// Run a read-only closure against the deck's current state.
    pub fn read<T>(&self, id: DeckId, f: impl FnOnce(&Deck) -> T) -> Result<T, CoreError> {
        let inner = self.read_lock();
        let deck = inner
            .decks
            .get(&id)
            .ok_or(CoreError::NotFound { entity: "Deck", id })?;
        Ok(f(deck))
    }

    /// Atomically mutate the deck's current state.
    ///
    /// Progress is recomputed and `updated_at` bumped inside the same
    /// critical section as the mutation.
    pub fn patch<T>(&self, id: DeckId, f: impl FnOnce(&mut Deck) -> T) -> Result<T, CoreError> {
        let mut inner = self.write_lock();
        let deck = inner
            .decks
            .get_mut(&id)
            .ok_or(CoreError::NotFound { entity: "Deck", id })?;
        let out = f(deck);
        deck.refresh_progress();
        deck.updated_at = chrono::Utc::now();
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
