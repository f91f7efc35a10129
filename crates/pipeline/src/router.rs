//! Routing of state updates to the deck that owns a run.
//!
//! A batch can keep running long after the user switches to another deck.
//! [`DeckRouter`] captures the owning deck's id at the moment an operation
//! begins; every later read and write resolves through the store to that
//! deck's current backing state, leaving whichever deck is active
//! untouched.  Reads during a long-running job (for example the attempt
//! count consulted before overwriting a result) go through the same
//! resolution rule, never through a stale snapshot.

use std::sync::Arc;

use deckgen_core::deck::Deck;
use deckgen_core::error::CoreError;
use deckgen_core::page::Page;
use deckgen_core::types::{DeckId, PageId};

use crate::store::DeckStore;

/// Write/read handle bound to one owning deck.
#[derive(Clone)]
pub struct DeckRouter {
    store: Arc<DeckStore>,
    owner: DeckId,
}

impl DeckRouter {
    /// Capture the owning deck for an operation that is about to begin.
    pub fn capture(store: Arc<DeckStore>, owner: DeckId) -> Self {
        Self { store, owner }
    }

    /// The deck this router writes to.
    pub fn owner(&self) -> DeckId {
        self.owner
    }

    /// Read from the owning deck's current state.
    pub fn read<T>(&self, f: impl FnOnce(&Deck) -> T) -> Result<T, CoreError> {
        self.store.read(self.owner, f)
    }

    /// Atomically mutate the owning deck's current state.
    pub fn patch<T>(&self, f: impl FnOnce(&mut Deck) -> T) -> Result<T, CoreError> {
        self.store.patch(self.owner, f)
    }

    /// Read one page of the owning deck.
    pub fn read_page<T>(
        &self,
        page_id: PageId,
        f: impl FnOnce(&Page) -> T,
    ) -> Result<T, CoreError> {
        self.store.read(self.owner, |deck| {
            deck.page(page_id)
                .map(f)
                .ok_or(CoreError::NotFound { entity: "Page", id: page_id })
        })?
    }

    /// Atomically mutate one page of the owning deck.
    pub fn patch_page<T>(
        &self,
        page_id: PageId,
        f: impl FnOnce(&mut Page) -> T,
    ) -> Result<T, CoreError> {
        self.store.patch(self.owner, |deck| {
            deck.page_mut(page_id)
                .map(f)
                .ok_or(CoreError::NotFound { entity: "Page", id: page_id })
        })?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
