//! Session phases, generation tags, and crop events.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rect::{CropRect, PercentCrop};

/// Monotonically increasing tag identifying one image session.
///
/// Bumped on every reset or new-image event. Asynchronous results carry the
/// generation they were started under and are dropped when it no longer matches.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation following this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase of the upload, crop, submit, result cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No image loaded
    #[default]
    Idle,
    /// Image decoded and laid out, no crop yet
    ImageLoaded,
    /// Crop selector active
    CropPending,
    /// Rasterized crop sent to the prediction service
    Submitting,
    /// Prediction received for the current image
    ResultReady,
    /// Last submission failed; awaiting acknowledgement
    Failed,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::ImageLoaded => "image_loaded",
            SessionPhase::CropPending => "crop_pending",
            SessionPhase::Submitting => "submitting",
            SessionPhase::ResultReady => "result_ready",
            SessionPhase::Failed => "failed",
        }
    }

    /// True while an image is held by the session.
    pub fn has_image(&self) -> bool {
        !matches!(self, SessionPhase::Idle)
    }

    /// True while the crop selector accepts updates.
    pub fn accepts_crop(&self) -> bool {
        matches!(self, SessionPhase::ImageLoaded | SessionPhase::CropPending)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Update emitted by the crop selector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CropEvent {
    /// Continuous update during a drag, in percent of the displayed image
    Live(PercentCrop),
    /// Final rectangle after drag-release or resize-release, in display pixels
    Completed(CropRect),
}
