//! The deck aggregate: one presentation and its batch state.

use serde::{Deserialize, Serialize};

use crate::batch::{compute_progress, GenerationStatus, Progress};
use crate::image::ImageData;
use crate::outline::{merge_outline, OutlineEntry};
use crate::page::Page;
use crate::types::{DeckId, PageId, Timestamp};

/// Default aspect ratio for generated slides.
pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Shared style configuration applied to every page's generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Free-text style directive appended to every instruction.
    #[serde(default)]
    pub style_prompt: Option<String>,
    /// Aspect ratio requested from the generation service.
    pub aspect_ratio: String,
    /// Optional resolution hint (provider-specific, e.g. `"2K"`).
    #[serde(default)]
    pub image_size: Option<String>,
    /// Base reference image included in every generation call.  Required
    /// before any page can be generated.
    #[serde(default)]
    pub base_reference: Option<ImageData>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            style_prompt: None,
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
            image_size: None,
            base_reference: None,
        }
    }
}

/// One presentation: pages plus the aggregate batch state.
///
/// Several decks can exist at once; jobs started for a deck keep updating
/// it even after another deck becomes the active one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub title: String,
    pub pages: Vec<Page>,
    /// Aggregate status of the whole batch, not of any single page.
    pub generation_status: GenerationStatus,
    /// Derived progress; recomputed after every page mutation.
    pub progress: Progress,
    pub style: StyleConfig,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Deck {
    /// Create an empty deck.
    pub fn new(title: impl Into<String>, style: StyleConfig) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            title: title.into(),
            pages: Vec::new(),
            generation_status: GenerationStatus::Idle,
            progress: Progress::default(),
            style,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the page set from a (re)generated outline, preserving
    /// per-page results by page number, and reset the batch to idle.
    pub fn replace_outline(&mut self, entries: Vec<OutlineEntry>) {
        self.pages = merge_outline(&self.pages, entries);
        self.generation_status = GenerationStatus::Idle;
        self.refresh_progress();
    }

    /// Recompute `progress` from the page collection.
    pub fn refresh_progress(&mut self) {
        self.progress = compute_progress(&self.pages);
    }

    /// Look up a page by id.
    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Look up a page by id, mutably.
    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageStatus;

    fn outline(n: u32) -> Vec<OutlineEntry> {
        (1..=n)
            .map(|i| OutlineEntry {
                page_number: i,
                heading: format!("Page {i}"),
                points: Vec::new(),
                image_desc: None,
                script: String::new(),
                supplement_text: None,
                is_title: i == 1,
            })
            .collect()
    }

    #[test]
    fn replace_outline_resets_batch_state() {
        let mut deck = Deck::new("Quarterly review", StyleConfig::default());
        deck.generation_status = GenerationStatus::Error;
        deck.replace_outline(outline(3));

        assert_eq!(deck.pages.len(), 3);
        assert_eq!(deck.generation_status, GenerationStatus::Idle);
        assert_eq!(deck.progress, Progress { completed: 0, total: 3 });
        assert!(deck.pages[0].is_title);
    }

    #[test]
    fn refresh_progress_tracks_page_statuses() {
        let mut deck = Deck::new("Demo", StyleConfig::default());
        deck.replace_outline(outline(2));
        deck.pages[0].status = PageStatus::Skipped;
        deck.refresh_progress();
        assert_eq!(deck.progress, Progress { completed: 1, total: 2 });
    }

    #[test]
    fn page_lookup_by_id() {
        let mut deck = Deck::new("Demo", StyleConfig::default());
        deck.replace_outline(outline(2));
        let id = deck.pages[1].id;
        assert_eq!(deck.page(id).unwrap().page_number, 2);
        assert!(deck.page(uuid::Uuid::new_v4()).is_none());
    }
}
