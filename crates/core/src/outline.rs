//! Outline entries and outline-to-page construction.
//!
//! An outline is the synthesized slide list for a deck.  Accepting an
//! outline creates one [`Page`] per entry; regenerating an outline replaces
//! the whole page set while preserving per-page generation results by
//! matching on page number.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::page::{Page, PageStatus, Supplement};

/// Maximum number of slides accepted in one outline.
pub const MAX_OUTLINE_PAGES: usize = 100;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One synthesized slide specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// 1-based slide number.
    pub page_number: u32,
    /// Slide heading.
    pub heading: String,
    /// Bullet points.
    #[serde(default)]
    pub points: Vec<String>,
    /// Optional hint describing the desired visual.
    #[serde(default)]
    pub image_desc: Option<String>,
    /// Speaker script.
    #[serde(default)]
    pub script: String,
    /// Optional free-text supplement.
    #[serde(default)]
    pub supplement_text: Option<String>,
    /// Whether this entry is the deck's title page.
    #[serde(default)]
    pub is_title: bool,
}

impl OutlineEntry {
    /// Build a fresh pending [`Page`] from this entry.
    pub fn into_page(self) -> Page {
        Page {
            id: uuid::Uuid::new_v4(),
            page_number: self.page_number,
            heading: self.heading,
            points: self.points,
            image_desc: self.image_desc,
            script: self.script,
            supplement: self.supplement_text.map(|text| Supplement {
                text,
                images: Vec::new(),
            }),
            is_title: self.is_title,
            status: PageStatus::Pending,
            result: None,
            manual_override: None,
            error: None,
            attempts: 0,
        }
    }
}

/// Validate an outline: non-empty, bounded, headed entries with unique
/// positive page numbers.
pub fn validate_outline(entries: &[OutlineEntry]) -> Result<(), CoreError> {
    if entries.is_empty() {
        return Err(CoreError::Validation(
            "Outline must contain at least one page".to_string(),
        ));
    }
    if entries.len() > MAX_OUTLINE_PAGES {
        return Err(CoreError::Validation(format!(
            "Outline must not exceed {MAX_OUTLINE_PAGES} pages"
        )));
    }

    let mut seen = std::collections::HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.page_number == 0 {
            return Err(CoreError::Validation(
                "Page numbers are 1-based; 0 is not a valid page number".to_string(),
            ));
        }
        if entry.heading.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Page {} has an empty heading",
                entry.page_number
            )));
        }
        if !seen.insert(entry.page_number) {
            return Err(CoreError::Validation(format!(
                "Duplicate page number: {}",
                entry.page_number
            )));
        }
    }
    Ok(())
}

/// Parse the outline JSON returned by the LLM call.
///
/// Accepts either a bare array of entries or an object with a `pages`
/// array (models wrap the array in an object often enough to tolerate it).
pub fn parse_outline(json: &str) -> Result<Vec<OutlineEntry>, CoreError> {
    #[derive(Deserialize)]
    struct Wrapper {
        pages: Vec<OutlineEntry>,
    }

    let entries: Vec<OutlineEntry> = match serde_json::from_str::<Vec<OutlineEntry>>(json) {
        Ok(entries) => entries,
        Err(_) => {
            serde_json::from_str::<Wrapper>(json)
                .map(|w| w.pages)
                .map_err(|e| {
                    CoreError::Validation(format!("Outline response is not valid JSON: {e}"))
                })?
        }
    };

    let mut entries = entries;
    entries.sort_by_key(|e| e.page_number);
    validate_outline(&entries)?;
    Ok(entries)
}

/// JSON schema for structured outline output, passed to the LLM call so
/// the response matches [`parse_outline`].
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "page_number": { "type": "integer" },
                "heading": { "type": "string" },
                "points": { "type": "array", "items": { "type": "string" } },
                "image_desc": { "type": "string" },
                "script": { "type": "string" },
                "is_title": { "type": "boolean" }
            },
            "required": ["page_number", "heading", "script"]
        }
    })
}

// ---------------------------------------------------------------------------
// Outline replacement
// ---------------------------------------------------------------------------

/// Build the replacement page set when an outline is regenerated.
///
/// Entries are matched against existing pages by `page_number`.  A matched
/// page keeps its id, status, generation result, manual override, and
/// attempt history; its content fields come from the new entry.  Unmatched
/// old pages are dropped; new page numbers start pending.
pub fn merge_outline(existing: &[Page], entries: Vec<OutlineEntry>) -> Vec<Page> {
    entries
        .into_iter()
        .map(|entry| {
            match existing.iter().find(|p| p.page_number == entry.page_number) {
                Some(old) => {
                    let mut page = entry.into_page();
                    page.id = old.id;
                    page.status = old.status;
                    page.result = old.result.clone();
                    page.manual_override = old.manual_override.clone();
                    page.error = old.error.clone();
                    page.attempts = old.attempts;
                    page
                }
                None => entry.into_page(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageData;
    use crate::page::PageResult;

    fn entry(page_number: u32, heading: &str) -> OutlineEntry {
        OutlineEntry {
            page_number,
            heading: heading.to_string(),
            points: vec!["point".to_string()],
            image_desc: None,
            script: "script".to_string(),
            supplement_text: None,
            is_title: page_number == 1,
        }
    }

    // -- validate_outline -----------------------------------------------------

    #[test]
    fn valid_outline_passes() {
        let entries = vec![entry(1, "Intro"), entry(2, "Body")];
        assert!(validate_outline(&entries).is_ok());
    }

    #[test]
    fn empty_outline_rejected() {
        let err = validate_outline(&[]).unwrap_err();
        assert!(err.to_string().contains("at least one page"));
    }

    #[test]
    fn duplicate_page_numbers_rejected() {
        let entries = vec![entry(1, "Intro"), entry(1, "Also intro")];
        let err = validate_outline(&entries).unwrap_err();
        assert!(err.to_string().contains("Duplicate page number"));
    }

    #[test]
    fn zero_page_number_rejected() {
        let entries = vec![entry(0, "Broken")];
        assert!(validate_outline(&entries).is_err());
    }

    #[test]
    fn blank_heading_rejected() {
        let entries = vec![entry(1, "  ")];
        let err = validate_outline(&entries).unwrap_err();
        assert!(err.to_string().contains("empty heading"));
    }

    // -- parse_outline --------------------------------------------------------

    #[test]
    fn parses_bare_array() {
        let json = r#"[
            {"page_number": 2, "heading": "Second", "script": "b"},
            {"page_number": 1, "heading": "First", "script": "a", "is_title": true}
        ]"#;
        let entries = parse_outline(json).unwrap();
        assert_eq!(entries.len(), 2);
        // Sorted by page number regardless of response order.
        assert_eq!(entries[0].heading, "First");
        assert!(entries[0].is_title);
    }

    #[test]
    fn parses_pages_wrapper_object() {
        let json = r#"{"pages": [{"page_number": 1, "heading": "Only"}]}"#;
        let entries = parse_outline(json).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].heading, "Only");
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_outline("here is your outline!").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    // -- merge_outline --------------------------------------------------------

    #[test]
    fn merge_preserves_results_by_page_number() {
        let mut old = entry(1, "Old heading").into_page();
        old.begin_generation().unwrap();
        old.complete(PageResult {
            image: ImageData::png("aW1n"),
            preview: None,
            stored_path: None,
            generated_at: chrono::Utc::now(),
        })
        .unwrap();
        let old_id = old.id;

        let merged = merge_outline(
            &[old],
            vec![entry(1, "New heading"), entry(2, "Brand new")],
        );

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, old_id);
        assert_eq!(merged[0].heading, "New heading");
        assert_eq!(merged[0].status, PageStatus::Completed);
        assert_eq!(merged[0].attempts, 1);
        assert!(merged[0].result.is_some());

        assert_eq!(merged[1].status, PageStatus::Pending);
        assert!(merged[1].result.is_none());
    }

    #[test]
    fn merge_drops_unmatched_old_pages() {
        let old = vec![entry(1, "One").into_page(), entry(2, "Two").into_page()];
        let merged = merge_outline(&old, vec![entry(1, "One again")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].page_number, 1);
    }
}
