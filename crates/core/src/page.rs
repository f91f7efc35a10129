//! Page model and status machine.
//!
//! A [`Page`] is one slide's generation job: its content (from the
//! outline), its current [`PageStatus`], the latest generation result, and
//! an optional user-supplied manual image that wins for display.
//!
//! Status transitions are restricted to the legal set enforced by
//! [`can_transition`]; the only bypass is [`Page::apply_manual`], which
//! marks a page completed without a generation run.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::image::ImageData;
use crate::types::{PageId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status of a single page's generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Waiting to be generated (initial state, and the state a cancelled
    /// job reverts to).
    Pending,
    /// A generation call is in flight.
    Running,
    /// Generation (or a manual upload) produced an image.
    Completed,
    /// The generation call returned an error.
    Failed,
    /// Explicitly skipped by the user.
    Skipped,
}

impl PageStatus {
    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Skipped => "Skipped",
        }
    }

    /// Whether this status counts toward batch progress.
    ///
    /// `Skipped` and `Completed` are consumed identically by progress
    /// counting.
    pub fn counts_as_done(self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

/// The legal transition set for page statuses.
///
/// - `Pending -> Running`: job start (batch start, single run, or retry).
/// - `Running -> Completed`: generation and post-processing succeeded.
/// - `Running -> Failed`: generation returned an error.
/// - `Running -> Pending`: the job was cancelled; a revert, not a failure.
/// - `Pending -> Skipped`, `Failed -> Skipped`: explicit user skip.
/// - `Completed -> Running`, `Failed -> Running`: explicit retry.
/// - `Failed -> Pending`: batch-retry revert before a new run.
pub fn can_transition(from: PageStatus, to: PageStatus) -> bool {
    use PageStatus::*;
    matches!(
        (from, to),
        (Pending, Running)
            | (Running, Completed)
            | (Running, Failed)
            | (Running, Pending)
            | (Pending, Skipped)
            | (Failed, Skipped)
            | (Completed, Running)
            | (Failed, Running)
            | (Failed, Pending)
    )
}

// ---------------------------------------------------------------------------
// Page content and results
// ---------------------------------------------------------------------------

/// Free-text supplement plus auxiliary reference images attached to a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Supplement {
    /// Additional instruction text supplied by the user.
    pub text: String,
    /// Auxiliary images passed to the generation call alongside the base
    /// reference.
    #[serde(default)]
    pub images: Vec<ImageData>,
}

/// Outcome of a successful generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// The full-resolution generated image.
    pub image: ImageData,
    /// Downscaled preview, if derivation succeeded.
    pub preview: Option<ImageData>,
    /// Filesystem path of the persisted copy, if persistence succeeded.
    pub stored_path: Option<String>,
    /// When the generation finished (UTC).
    pub generated_at: Timestamp,
}

/// A user-uploaded image that overrides the generated result for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualImage {
    /// The uploaded image.
    pub image: ImageData,
    /// Downscaled preview, if available.
    pub preview: Option<ImageData>,
}

/// One slide's generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Stable unique id, independent of the page's position.
    pub id: PageId,
    /// 1-based slide number.
    pub page_number: u32,
    /// Slide heading.
    pub heading: String,
    /// Bullet points.
    pub points: Vec<String>,
    /// Optional hint describing the desired visual.
    pub image_desc: Option<String>,
    /// Speaker script for the slide.
    pub script: String,
    /// Optional user supplement (free text + auxiliary images).
    pub supplement: Option<Supplement>,
    /// Whether this page is the deck's title page.
    pub is_title: bool,
    /// Current job status.
    pub status: PageStatus,
    /// Latest successful generation result.  Retained across later
    /// failures so the last good image stays displayable.
    pub result: Option<PageResult>,
    /// User-supplied override; wins over `result` for display.
    pub manual_override: Option<ManualImage>,
    /// Error message; present only while `status == Failed`.
    pub error: Option<String>,
    /// Number of completed generation runs for this page.
    pub attempts: u32,
}

impl Page {
    /// The image to show for this page: the manual override when present,
    /// otherwise the latest generated image.
    pub fn display_image(&self) -> Option<&ImageData> {
        if let Some(manual) = &self.manual_override {
            return Some(&manual.image);
        }
        self.result.as_ref().map(|r| &r.image)
    }

    // ---- status transitions ----

    /// Move to `next`, enforcing the legal transition set.
    ///
    /// Clears `error` on any transition out of `Failed`.
    fn set_status(&mut self, next: PageStatus) -> Result<(), CoreError> {
        if !can_transition(self.status, next) {
            return Err(CoreError::Conflict(format!(
                "Page {} cannot move from {} to {}",
                self.page_number,
                self.status.label(),
                next.label(),
            )));
        }
        if self.status == PageStatus::Failed {
            self.error = None;
        }
        self.status = next;
        Ok(())
    }

    /// Mark the page running and clear any previous error.
    pub fn begin_generation(&mut self) -> Result<(), CoreError> {
        self.set_status(PageStatus::Running)
    }

    /// Record a successful generation.
    pub fn complete(&mut self, result: PageResult) -> Result<(), CoreError> {
        self.set_status(PageStatus::Completed)?;
        self.result = Some(result);
        self.attempts += 1;
        Ok(())
    }

    /// Record a generation failure with a user-facing message.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        self.set_status(PageStatus::Failed)?;
        self.error = Some(message.into());
        Ok(())
    }

    /// Revert a cancelled running job back to pending.  No error is
    /// recorded: cancellation is not a failure.
    pub fn revert(&mut self) -> Result<(), CoreError> {
        self.set_status(PageStatus::Pending)
    }

    /// Revert a failed page to pending ahead of a batch retry, clearing
    /// its error.
    pub fn reset_for_retry(&mut self) -> Result<(), CoreError> {
        self.set_status(PageStatus::Pending)
    }

    /// Skip the page.  A no-op when already skipped; a conflict from
    /// `Running` (stop the job first) or `Completed`.
    pub fn skip(&mut self) -> Result<(), CoreError> {
        if self.status == PageStatus::Skipped {
            return Ok(());
        }
        self.set_status(PageStatus::Skipped)
    }

    /// Attach a manual image and mark the page completed, independent of
    /// whether a generation attempt ever ran.
    ///
    /// Rejected while a generation call is in flight: the settling call
    /// could otherwise overwrite the terminal state.
    pub fn apply_manual(&mut self, manual: ManualImage) -> Result<(), CoreError> {
        if self.status == PageStatus::Running {
            return Err(CoreError::Conflict(format!(
                "Page {} is running; stop it before uploading a manual image",
                self.page_number,
            )));
        }
        self.manual_override = Some(manual);
        self.status = PageStatus::Completed;
        self.error = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
