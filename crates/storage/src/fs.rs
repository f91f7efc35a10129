//! Filesystem [`ImageStore`] implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;

use deckgen_core::image::ImageData;
use deckgen_core::types::DeckId;
use deckgen_pipeline::{ImageStore, ImageStoreError, StoredImage};

use crate::preview::{derive_preview, PREVIEW_MAX_EDGE};

/// Sidecar metadata written next to each persisted image.
#[derive(Debug, Serialize)]
struct PersistedMeta<'a> {
    name: &'a str,
    deck_id: DeckId,
    mime_type: &'a str,
    created_at: i64,
}

/// Persists images under `<root>/decks/<deck_id>/`.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn deck_dir(&self, deck_id: DeckId) -> PathBuf {
        self.root.join("decks").join(deck_id.to_string())
    }
}

/// File extension for a MIME type; unknown types fall back to `bin`.
fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "bin",
    }
}

fn io_error(context: &str, path: &Path, e: std::io::Error) -> ImageStoreError {
    ImageStoreError::Io(format!("{context} {}: {e}", path.display()))
}

#[async_trait]
impl ImageStore for FsImageStore {
    fn derive_preview(&self, image: &ImageData) -> Result<ImageData, ImageStoreError> {
        derive_preview(image, PREVIEW_MAX_EDGE)
    }

    async fn persist(
        &self,
        image: &ImageData,
        preview: Option<&ImageData>,
        deck_id: DeckId,
        name: &str,
    ) -> Result<StoredImage, ImageStoreError> {
        let bytes = image
            .decode()
            .map_err(|e| ImageStoreError::Codec(e.to_string()))?;

        let dir = self.deck_dir(deck_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error("Failed to create", &dir, e))?;

        let stem = format!(
            "{name}_{}_{}",
            uuid::Uuid::new_v4(),
            chrono::Utc::now().timestamp(),
        );

        let image_path = dir.join(format!("{stem}.{}", extension_for(&image.mime_type)));
        tokio::fs::write(&image_path, &bytes)
            .await
            .map_err(|e| io_error("Failed to write", &image_path, e))?;

        if let Some(preview) = preview {
            let preview_bytes = preview
                .decode()
                .map_err(|e| ImageStoreError::Codec(e.to_string()))?;
            let preview_path = dir.join(format!("{stem}.thumb.png"));
            tokio::fs::write(&preview_path, &preview_bytes)
                .await
                .map_err(|e| io_error("Failed to write", &preview_path, e))?;
        }

        let meta = PersistedMeta {
            name,
            deck_id,
            mime_type: &image.mime_type,
            created_at: chrono::Utc::now().timestamp(),
        };
        let meta_path = dir.join(format!("{stem}.meta.json"));
        let meta_json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| ImageStoreError::Io(format!("Failed to serialize metadata: {e}")))?;
        tokio::fs::write(&meta_path, meta_json)
            .await
            .map_err(|e| io_error("Failed to write", &meta_path, e))?;

        tracing::debug!(path = %image_path.display(), "Persisted generated image");
        Ok(StoredImage {
            path: image_path.to_string_lossy().into_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
