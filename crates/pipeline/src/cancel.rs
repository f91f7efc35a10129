//! Per-page cancellation registry.
//!
//! Maps page ids to the [`CancellationToken`] of their in-flight
//! generation call.  Registration hands back a scope guard whose `Drop`
//! removes the entry, so the mapping is cleared on every exit path of the
//! generation future (success, error, or cancellation).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use deckgen_core::types::PageId;

struct Entry {
    /// Registration sequence number; lets a guard's `Drop` skip removal
    /// when a newer run has already re-registered the same page id.
    seq: u64,
    token: CancellationToken,
}

/// Registry of outstanding cancellation tokens, keyed by page id.
#[derive(Default)]
pub struct CancellationRegistry {
    inner: Mutex<HashMap<PageId, Entry>>,
    next_seq: AtomicU64,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PageId, Entry>> {
        // A poisoned lock only means some holder panicked; the map itself
        // is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a fresh token for a page, replacing any stale entry.
    ///
    /// The returned guard removes the entry when dropped.
    pub fn register(&self, id: PageId) -> CancellationGuard<'_> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.lock().insert(
            id,
            Entry {
                seq,
                token: token.clone(),
            },
        );
        CancellationGuard {
            registry: self,
            id,
            seq,
            token,
        }
    }

    /// Cancel and remove the entry for `id`.  Returns whether an entry
    /// existed; cancelling an absent id is a no-op.
    pub fn cancel(&self, id: PageId) -> bool {
        match self.lock().remove(&id) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel and remove every entry for the given pages.  Returns how
    /// many in-flight calls were cancelled.
    pub fn cancel_pages(&self, ids: &[PageId]) -> usize {
        let mut map = self.lock();
        let mut cancelled = 0;
        for id in ids {
            if let Some(entry) = map.remove(id) {
                entry.token.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Whether a page currently has an outstanding token.
    pub fn is_registered(&self, id: PageId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of outstanding tokens.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Scope guard for one page's registration.
///
/// Dropping the guard removes the registry entry unless a newer
/// registration for the same page has replaced it.
pub struct CancellationGuard<'a> {
    registry: &'a CancellationRegistry,
    id: PageId,
    seq: u64,
    token: CancellationToken,
}

impl CancellationGuard<'_> {
    /// The token to race the generation call against.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for CancellationGuard<'_> {
    fn drop(&mut self) {
        let mut map = self.registry.lock();
        if map.get(&self.id).is_some_and(|e| e.seq == self.seq) {
            map.remove(&self.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
