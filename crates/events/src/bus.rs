//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`GenerationEvent`]s.  The
//! orchestrator publishes a page or batch transition the moment it is
//! written to the deck store; the API layer forwards events to WebSocket
//! clients.  Share it via `Arc<EventBus>`.

use serde::Serialize;
use tokio::sync::broadcast;

use deckgen_core::batch::GenerationStatus;
use deckgen_core::types::{DeckId, PageId};

// ---------------------------------------------------------------------------
// GenerationEvent
// ---------------------------------------------------------------------------

/// A generation lifecycle event.
///
/// Every variant names the owning deck: a long-running batch keeps
/// emitting for its own deck even after another deck becomes active.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// A page's generation call was launched.
    PageStarted {
        deck_id: DeckId,
        page_id: PageId,
        page_number: u32,
    },

    /// A page finished successfully.
    PageCompleted {
        deck_id: DeckId,
        page_id: PageId,
        page_number: u32,
        attempts: u32,
    },

    /// A page's generation call failed.
    PageFailed {
        deck_id: DeckId,
        page_id: PageId,
        page_number: u32,
        /// Human-readable error description.
        error: String,
    },

    /// A page's in-flight call was cancelled and the page reverted to
    /// pending.  Not a failure; no error is carried.
    PageReverted {
        deck_id: DeckId,
        page_id: PageId,
        page_number: u32,
    },

    /// The batch-level status of a deck changed.
    BatchStatusChanged {
        deck_id: DeckId,
        status: GenerationStatus,
    },
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`GenerationEvent`].
pub struct EventBus {
    sender: broadcast::Sender<GenerationEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: GenerationEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
