//! Batch-level status and progress derivation.
//!
//! The batch status and progress are derived summaries over a deck's pages.
//! Progress is always recomputed from the full page collection -- never
//! incremented -- so concurrent per-page completions cannot drift it.

use serde::{Deserialize, Serialize};

use crate::page::{Page, PageStatus};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status of a whole generation batch (not of any one page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    /// No batch run has started (or the last run left work behind).
    Idle,
    /// A batch run (or single-page run) is in progress.
    Running,
    /// The user paused the batch; in-flight jobs were reverted.
    Paused,
    /// Every page is completed or skipped.
    Completed,
    /// The last run finished with at least one failed page.
    Error,
}

impl GenerationStatus {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Error => "Error",
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Completed-over-total progress for a batch.
///
/// `completed` counts pages whose status is `Completed` or `Skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Recompute progress from the full page collection.
pub fn compute_progress(pages: &[Page]) -> Progress {
    Progress {
        completed: pages.iter().filter(|p| p.status.counts_as_done()).count(),
        total: pages.len(),
    }
}

// ---------------------------------------------------------------------------
// Run summaries
// ---------------------------------------------------------------------------

/// Derive the batch status after a run has settled: `Error` if any page
/// remains failed, `Completed` when every page is completed or skipped,
/// `Idle` otherwise (pages stopped back to pending are still to be run).
pub fn summarize_run(pages: &[Page]) -> GenerationStatus {
    if pages.iter().any(|p| p.status == PageStatus::Failed) {
        GenerationStatus::Error
    } else if all_done(pages) {
        GenerationStatus::Completed
    } else {
        GenerationStatus::Idle
    }
}

/// Whether any page currently has a generation call in flight.
pub fn any_running(pages: &[Page]) -> bool {
    pages.iter().any(|p| p.status == PageStatus::Running)
}

/// Whether every page is completed or skipped.
pub fn all_done(pages: &[Page]) -> bool {
    pages.iter().all(|p| p.status.counts_as_done())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
