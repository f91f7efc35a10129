//! Service contracts consumed by the orchestrator.
//!
//! The generation provider and the thumbnail/persistence backend are
//! injected behind traits so the orchestrator is testable with scripted
//! fakes and independent of any one remote API.

use async_trait::async_trait;

use deckgen_core::image::ImageData;
use deckgen_core::types::DeckId;

// ---------------------------------------------------------------------------
// Page generation
// ---------------------------------------------------------------------------

/// One assembled generation request: the composed instruction text plus
/// the base reference image and any auxiliary references.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Fully composed instruction text for this page.
    pub instruction: String,
    /// Reference images, base reference first.
    pub references: Vec<ImageData>,
    /// Requested aspect ratio, e.g. `"16:9"`.
    pub aspect_ratio: String,
    /// Optional provider-specific resolution hint.
    pub image_size: Option<String>,
}

/// Error from a generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The remote service failed or rejected the call.  The message is
    /// surfaced to the user on the failed page.
    #[error("{0}")]
    Service(String),
}

/// An asynchronous, single-shot "generate one page" provider.
///
/// Cancellation is cooperative from the caller's side: the orchestrator
/// races the returned future against the page's cancellation token and
/// drops it when the token fires, which aborts the underlying request.
#[async_trait]
pub trait PageGenerator: Send + Sync {
    /// Generate one slide image.
    async fn generate(&self, request: PageRequest) -> Result<ImageData, GenerateError>;
}

// ---------------------------------------------------------------------------
// Thumbnail / persistence
// ---------------------------------------------------------------------------

/// Reference to a persisted image.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Filesystem path of the persisted full-resolution image.
    pub path: String,
}

/// Errors from the thumbnail/persistence backend.
///
/// Both are non-fatal to generation: the orchestrator logs them and keeps
/// the in-memory result.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    /// The image payload could not be decoded or re-encoded.
    #[error("{0}")]
    Codec(String),

    /// Writing to durable storage failed.
    #[error("{0}")]
    Io(String),
}

/// Converts a full-resolution result into a lightweight preview and
/// persists both to durable storage.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Derive a downscaled preview from a full-resolution image.
    fn derive_preview(&self, image: &ImageData) -> Result<ImageData, ImageStoreError>;

    /// Persist an image (and its preview, when available) under the given
    /// deck, returning a reference to the stored copy.
    async fn persist(
        &self,
        image: &ImageData,
        preview: Option<&ImageData>,
        deck_id: DeckId,
        name: &str,
    ) -> Result<StoredImage, ImageStoreError>;
}
