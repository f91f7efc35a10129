//! The batch orchestrator.
//!
//! Drives every page of a deck through its generation lifecycle.  One
//! orchestrator serves all decks in the store; each operation captures a
//! [`DeckRouter`] up front so state keeps flowing to the owning deck even
//! if the user switches decks mid-run.
//!
//! `start` fans out one generation call per pending page, bounded only by
//! the pending-page count, and waits for all of them to settle before
//! deriving the batch's final status.  Pause is a hard stop: in-flight
//! calls are cancelled and reverted to pending, keeping no partial
//! results.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use deckgen_core::batch::{all_done, any_running, summarize_run, GenerationStatus};
use deckgen_core::error::CoreError;
use deckgen_core::image::ImageData;
use deckgen_core::page::{ManualImage, PageResult, PageStatus};
use deckgen_core::prompt::compose_page_instruction;
use deckgen_core::types::{DeckId, PageId};
use deckgen_events::{EventBus, GenerationEvent};

use crate::cancel::CancellationRegistry;
use crate::router::DeckRouter;
use crate::service::{ImageStore, PageGenerator, PageRequest};
use crate::store::DeckStore;

/// Message used when a page fails its precondition check before any
/// network call is attempted.
const NO_REFERENCE_MSG: &str = "No base reference image is configured for this deck";

/// How a single page's generation settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageOutcome {
    Completed,
    Failed,
    /// The call was cancelled; the cancelling path reverted the page.
    Cancelled,
}

/// Orchestrates batch and single-page generation over the deck store.
pub struct BatchOrchestrator {
    store: Arc<DeckStore>,
    generator: Arc<dyn PageGenerator>,
    images: Arc<dyn ImageStore>,
    registry: CancellationRegistry,
    events: Arc<EventBus>,
    /// Decks whose current run was paused.  Checked after a run settles
    /// so the pause's `Paused` status is never overwritten.
    paused: Mutex<HashSet<DeckId>>,
}

impl BatchOrchestrator {
    pub fn new(
        store: Arc<DeckStore>,
        generator: Arc<dyn PageGenerator>,
        images: Arc<dyn ImageStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            generator,
            images,
            registry: CancellationRegistry::new(),
            events,
            paused: Mutex::new(HashSet::new()),
        }
    }

    /// The cancellation registry (exposed for tests and diagnostics).
    pub fn registry(&self) -> &CancellationRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Batch operations
    // -----------------------------------------------------------------------

    /// Run the whole batch: launch every pending page concurrently and
    /// wait for all of them to settle.
    ///
    /// With nothing pending the batch completes immediately.  The final
    /// status is derived from the page statuses after the run -- unless a
    /// pause happened meanwhile, in which case the pause's `Paused` wins.
    pub async fn start(&self, deck_id: DeckId) -> Result<(), CoreError> {
        let router = DeckRouter::capture(Arc::clone(&self.store), deck_id);
        self.clear_paused(deck_id);

        // Serialization point: one top-level batch run per deck.
        router.patch(|deck| {
            if deck.generation_status == GenerationStatus::Running {
                return Err(CoreError::Conflict(
                    "A generation run is already in progress for this deck".to_string(),
                ));
            }
            deck.generation_status = GenerationStatus::Running;
            Ok(())
        })??;
        self.publish_status(deck_id, GenerationStatus::Running);

        let pending: Vec<PageId> = router.read(|deck| {
            deck.pages
                .iter()
                .filter(|p| p.status == PageStatus::Pending)
                .map(|p| p.id)
                .collect()
        })?;

        if pending.is_empty() {
            router.patch(|deck| deck.generation_status = GenerationStatus::Completed)?;
            self.publish_status(deck_id, GenerationStatus::Completed);
            return Ok(());
        }

        tracing::info!(
            deck_id = %deck_id,
            pages = pending.len(),
            "Batch generation started",
        );

        let runs = pending.iter().map(|id| self.generate_page(&router, *id));
        let outcomes = futures::future::join_all(runs).await;
        for outcome in &outcomes {
            if let Err(e) = outcome {
                tracing::error!(deck_id = %deck_id, error = %e, "Page run failed internally");
            }
        }

        // A pause mid-run already set the batch status; leave it alone.
        if self.is_paused(deck_id) {
            return Ok(());
        }

        let status = router.patch(|deck| {
            let status = summarize_run(&deck.pages);
            deck.generation_status = status;
            status
        })?;
        self.publish_status(deck_id, status);
        Ok(())
    }

    /// Hard-stop the batch: cancel every in-flight call for this deck and
    /// synchronously revert the running pages to pending.
    ///
    /// Idempotent when nothing is running -- the page set is untouched but
    /// the batch status still becomes `Paused`.
    pub async fn pause(&self, deck_id: DeckId) -> Result<(), CoreError> {
        let running: Vec<PageId> = self.store.read(deck_id, |deck| {
            deck.pages
                .iter()
                .filter(|p| p.status == PageStatus::Running)
                .map(|p| p.id)
                .collect()
        })?;

        // The flag must be set before any call settles, so a finishing
        // `start` sees it and leaves the paused status in place.
        self.mark_paused(deck_id);
        let cancelled = self.registry.cancel_pages(&running);

        let reverted = self.store.patch(deck_id, |deck| {
            let mut reverted = Vec::new();
            for page in deck.pages.iter_mut().filter(|p| p.status == PageStatus::Running) {
                if page.revert().is_ok() {
                    reverted.push((page.id, page.page_number));
                }
            }
            deck.generation_status = GenerationStatus::Paused;
            reverted
        })?;

        tracing::info!(
            deck_id = %deck_id,
            cancelled,
            reverted = reverted.len(),
            "Batch paused",
        );

        for (page_id, page_number) in reverted {
            self.events.publish(GenerationEvent::PageReverted {
                deck_id,
                page_id,
                page_number,
            });
        }
        self.publish_status(deck_id, GenerationStatus::Paused);
        Ok(())
    }

    /// Clear the paused flag and run the pending-page scan again.
    pub async fn resume(&self, deck_id: DeckId) -> Result<(), CoreError> {
        self.clear_paused(deck_id);
        self.start(deck_id).await
    }

    /// Revert every failed page to pending, reset the batch to idle, and
    /// start a fresh run.
    pub async fn retry_all(&self, deck_id: DeckId) -> Result<(), CoreError> {
        let router = DeckRouter::capture(Arc::clone(&self.store), deck_id);
        router.patch(|deck| {
            if deck.generation_status == GenerationStatus::Running {
                return Err(CoreError::Conflict(
                    "Cannot retry while a generation run is in progress".to_string(),
                ));
            }
            for page in deck.pages.iter_mut().filter(|p| p.status == PageStatus::Failed) {
                let _ = page.reset_for_retry();
            }
            deck.generation_status = GenerationStatus::Idle;
            Ok(())
        })??;
        self.publish_status(deck_id, GenerationStatus::Idle);
        self.start(deck_id).await
    }

    // -----------------------------------------------------------------------
    // Single-page operations
    // -----------------------------------------------------------------------

    /// Generate one pending page without requiring the batch to be idle.
    pub async fn run_one(&self, deck_id: DeckId, page_id: PageId) -> Result<(), CoreError> {
        self.run_single(deck_id, page_id, &[PageStatus::Pending], "run").await
    }

    /// Re-run one failed or completed page.
    pub async fn retry_one(&self, deck_id: DeckId, page_id: PageId) -> Result<(), CoreError> {
        self.run_single(
            deck_id,
            page_id,
            &[PageStatus::Failed, PageStatus::Completed],
            "retry",
        )
        .await
    }

    /// Cancel one page's in-flight call and revert it to pending.  A
    /// no-op when the page has no outstanding call.
    pub async fn stop_one(&self, deck_id: DeckId, page_id: PageId) -> Result<(), CoreError> {
        let router = DeckRouter::capture(Arc::clone(&self.store), deck_id);
        if !self.registry.cancel(page_id) {
            return Ok(());
        }

        let reverted = router.patch(|deck| {
            deck.page_mut(page_id).and_then(|page| {
                (page.status == PageStatus::Running && page.revert().is_ok())
                    .then_some(page.page_number)
            })
        })?;

        if let Some(page_number) = reverted {
            self.events.publish(GenerationEvent::PageReverted {
                deck_id,
                page_id,
                page_number,
            });
        }
        Ok(())
    }

    /// Skip a page.  Running pages must be stopped first.
    pub fn skip(&self, deck_id: DeckId, page_id: PageId) -> Result<(), CoreError> {
        let router = DeckRouter::capture(Arc::clone(&self.store), deck_id);
        router.patch_page(page_id, |page| page.skip())?
    }

    /// Attach a user-supplied image to a page and mark it completed,
    /// independent of whether a generation attempt ever ran.
    pub fn upload_manual(
        &self,
        deck_id: DeckId,
        page_id: PageId,
        image: ImageData,
    ) -> Result<(), CoreError> {
        let router = DeckRouter::capture(Arc::clone(&self.store), deck_id);
        let preview = match self.images.derive_preview(&image) {
            Ok(preview) => Some(preview),
            Err(e) => {
                tracing::warn!(page_id = %page_id, error = %e, "Preview derivation failed");
                None
            }
        };
        router.patch_page(page_id, |page| page.apply_manual(ManualImage { image, preview }))?
    }

    // -----------------------------------------------------------------------
    // Per-page generation
    // -----------------------------------------------------------------------

    /// Run one page's generation: mark it running, register a cancellation
    /// token, call the provider, post-process, and write the terminal
    /// state -- unless the token fired, in which case the cancelling path
    /// owns the page and nothing is overwritten.
    async fn generate_page(
        &self,
        router: &DeckRouter,
        page_id: PageId,
    ) -> Result<PageOutcome, CoreError> {
        let deck_id = router.owner();

        // Snapshot the page content and style for request assembly; all
        // status writes below go through the router to the current state.
        let (page, style) = router.read(|deck| {
            deck.page(page_id)
                .cloned()
                .map(|page| (page, deck.style.clone()))
                .ok_or(CoreError::NotFound { entity: "Page", id: page_id })
        })??;
        let page_number = page.page_number;

        router.patch_page(page_id, |p| p.begin_generation())??;
        self.events.publish(GenerationEvent::PageStarted {
            deck_id,
            page_id,
            page_number,
        });

        // The guard removes the registry entry on every exit path.
        let guard = self.registry.register(page_id);
        let token = guard.token();

        // Precondition: a base reference image must be configured.
        let Some(base_reference) = style.base_reference.clone() else {
            return self.fail_page(router, page_id, page_number, NO_REFERENCE_MSG.to_string());
        };

        let mut references = vec![base_reference];
        if let Some(supplement) = &page.supplement {
            references.extend(supplement.images.iter().cloned());
        }
        let request = PageRequest {
            instruction: compose_page_instruction(&page, &style),
            references,
            aspect_ratio: style.aspect_ratio.clone(),
            image_size: style.image_size.clone(),
        };

        // Race the provider call against cancellation.  Dropping the call
        // future aborts the underlying request.
        let result = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(page_id = %page_id, "Generation cancelled in flight");
                return Ok(PageOutcome::Cancelled);
            }
            result = self.generator.generate(request) => result,
        };

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                // A cancelled call must never overwrite the pending revert
                // with a stale failure.
                if token.is_cancelled() {
                    return Ok(PageOutcome::Cancelled);
                }
                return self.fail_page(router, page_id, page_number, e.to_string());
            }
        };

        // Post-processing: preview derivation and persistence both degrade
        // gracefully -- the in-memory result stays available either way.
        let preview = match self.images.derive_preview(&image) {
            Ok(preview) => Some(preview),
            Err(e) => {
                tracing::warn!(page_id = %page_id, error = %e, "Preview derivation failed");
                None
            }
        };
        let name = format!("page-{page_number:03}");
        let stored_path = match self
            .images
            .persist(&image, preview.as_ref(), deck_id, &name)
            .await
        {
            Ok(stored) => Some(stored.path),
            Err(e) => {
                tracing::warn!(
                    page_id = %page_id,
                    error = %e,
                    "Persisting generated image failed; keeping result in memory",
                );
                None
            }
        };

        if token.is_cancelled() {
            return Ok(PageOutcome::Cancelled);
        }

        let result = PageResult {
            image,
            preview,
            stored_path,
            generated_at: chrono::Utc::now(),
        };
        let completed = router.patch_page(page_id, |p| p.complete(result).map(|_| p.attempts))?;
        match completed {
            Ok(attempts) => {
                self.events.publish(GenerationEvent::PageCompleted {
                    deck_id,
                    page_id,
                    page_number,
                    attempts,
                });
                Ok(PageOutcome::Completed)
            }
            // The page was reverted while post-processing was in flight;
            // the revert wins.
            Err(_) => Ok(PageOutcome::Cancelled),
        }
    }

    /// Write a failure onto a page, unless a concurrent revert got there
    /// first.
    fn fail_page(
        &self,
        router: &DeckRouter,
        page_id: PageId,
        page_number: u32,
        message: String,
    ) -> Result<PageOutcome, CoreError> {
        let failed = router.patch_page(page_id, |p| p.fail(message.clone()))?;
        match failed {
            Ok(()) => {
                self.events.publish(GenerationEvent::PageFailed {
                    deck_id: router.owner(),
                    page_id,
                    page_number,
                    error: message,
                });
                Ok(PageOutcome::Failed)
            }
            Err(_) => Ok(PageOutcome::Cancelled),
        }
    }

    /// Shared body of `run_one`/`retry_one`: validate the page, promote a
    /// settled batch to running, generate, then re-evaluate the batch.
    async fn run_single(
        &self,
        deck_id: DeckId,
        page_id: PageId,
        allowed: &[PageStatus],
        operation: &str,
    ) -> Result<(), CoreError> {
        let router = DeckRouter::capture(Arc::clone(&self.store), deck_id);

        let promoted = router.patch(|deck| {
            let page = deck
                .page(page_id)
                .ok_or(CoreError::NotFound { entity: "Page", id: page_id })?;
            if !allowed.contains(&page.status) {
                return Err(CoreError::Conflict(format!(
                    "Cannot {operation} page {}: it is {}",
                    page.page_number,
                    page.status.label(),
                )));
            }
            let promote = matches!(
                deck.generation_status,
                GenerationStatus::Idle | GenerationStatus::Completed
            );
            if promote {
                deck.generation_status = GenerationStatus::Running;
            }
            Ok(promote)
        })??;
        if promoted {
            self.publish_status(deck_id, GenerationStatus::Running);
        }

        self.generate_page(&router, page_id).await?;

        // Re-evaluate whether the whole batch is now done -- but only when
        // no pause is in effect and nothing else is still running.
        if self.is_paused(deck_id) {
            return Ok(());
        }
        let settled = router.patch(|deck| {
            if any_running(&deck.pages) {
                return None;
            }
            let status = if all_done(&deck.pages) {
                GenerationStatus::Completed
            } else {
                GenerationStatus::Idle
            };
            deck.generation_status = status;
            Some(status)
        })?;
        if let Some(status) = settled {
            self.publish_status(deck_id, status);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn publish_status(&self, deck_id: DeckId, status: GenerationStatus) {
        self.events
            .publish(GenerationEvent::BatchStatusChanged { deck_id, status });
    }

    fn paused_lock(&self) -> MutexGuard<'_, HashSet<DeckId>> {
        self.paused.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn mark_paused(&self, deck_id: DeckId) {
        self.paused_lock().insert(deck_id);
    }

    fn clear_paused(&self, deck_id: DeckId) {
        self.paused_lock().remove(&deck_id);
    }

    fn is_paused(&self, deck_id: DeckId) -> bool {
        self.paused_lock().contains(&deck_id)
    }
}
