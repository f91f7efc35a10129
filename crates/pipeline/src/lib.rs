//! Batch page-generation pipeline.
//!
//! Drives a deck's pages through `pending -> running -> (completed |
//! failed | skipped)` by fanning out one cancellable generation call per
//! pending page.  The orchestrator keeps results attached to the deck
//! that owns the run, even when the user switches to a different deck
//! while jobs are still in flight.

pub mod cancel;
pub mod orchestrator;
pub mod router;
pub mod service;
pub mod store;

pub use cancel::CancellationRegistry;
pub use orchestrator::BatchOrchestrator;
pub use router::DeckRouter;
pub use service::{GenerateError, ImageStore, ImageStoreError, PageGenerator, PageRequest, StoredImage};
pub use store::{DeckStore, DeckSummary};
