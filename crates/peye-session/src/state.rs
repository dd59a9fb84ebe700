//! The session state machine.
//!
//! | From         | Event                         | To           |
//! |--------------|-------------------------------|--------------|
//! | any          | image loaded                  | ImageLoaded  |
//! | any          | decode failed                 | Idle         |
//! | ImageLoaded  | crop event                    | CropPending  |
//! | CropPending  | crop event                    | CropPending  |
//! | CropPending  | submit (completed crop held)  | Submitting   |
//! | Submitting   | rasterization failed          | CropPending  |
//! | Submitting   | prediction succeeded          | ResultReady  |
//! | Submitting   | prediction failed             | Failed       |
//! | Failed       | failure acknowledged          | CropPending  |
//! | ResultReady  | identify another              | Idle         |
//!
//! Loading an image, failing to decode one, and resetting all bump the
//! [`Generation`]. Crop events and prediction outcomes tagged with an older
//! generation are dropped.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use peye_client::ClientResult;
use peye_media::{CropRasterizer, DecodeError, RasterBlob, RasterImage, RasterizationResult};
use peye_models::{CropEvent, CropRect, Generation, PercentCrop, PredictionResult, SessionPhase};

use crate::notice::SessionNotice;

/// A rasterized crop handed out for submission.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    /// Generation the crop was taken from
    pub generation: Generation,
    pub blob: RasterBlob,
}

/// What happened to a prediction outcome fed back into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Result stored; session is `ResultReady`
    Applied(PredictionResult),
    /// Session is `Failed` until the notice is acknowledged
    Failed(SessionNotice),
    /// Outcome belonged to an older generation and was dropped
    Stale,
}

/// Single-owner state for one page view.
#[derive(Debug)]
pub struct Session {
    phase: SessionPhase,
    generation: Generation,
    image: Option<RasterImage>,
    live_crop: Option<PercentCrop>,
    completed_crop: Option<CropRect>,
    result: Option<PredictionResult>,
    result_received_at: Option<DateTime<Utc>>,
    failure: Option<SessionNotice>,
    rasterizer: CropRasterizer,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CropRasterizer::default())
    }
}

impl Session {
    pub fn new(rasterizer: CropRasterizer) -> Self {
        Self {
            phase: SessionPhase::Idle,
            generation: Generation::default(),
            image: None,
            live_crop: None,
            completed_crop: None,
            result: None,
            result_received_at: None,
            failure: None,
            rasterizer,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn image(&self) -> Option<&RasterImage> {
        self.image.as_ref()
    }

    pub fn live_crop(&self) -> Option<PercentCrop> {
        self.live_crop
    }

    pub fn completed_crop(&self) -> Option<CropRect> {
        self.completed_crop
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn result_received_at(&self) -> Option<DateTime<Utc>> {
        self.result_received_at
    }

    /// Notice for the last failed submission, until acknowledged.
    pub fn failure(&self) -> Option<&SessionNotice> {
        self.failure.as_ref()
    }

    /// True when an identify trigger would start a submission.
    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::CropPending
            && self.image.is_some()
            && self.completed_crop.is_some()
    }

    /// Replace everything with a freshly loaded image.
    pub fn load_image(&mut self, image: RasterImage) -> Generation {
        self.clear();
        self.generation = self.generation.next();
        info!(
            generation = %self.generation,
            natural = %image.natural(),
            display = %image.display(),
            "Image loaded"
        );
        self.image = Some(image);
        self.transition(SessionPhase::ImageLoaded);
        self.generation
    }

    /// A selected file could not be decoded: drop back to `Idle`.
    pub fn decode_failed(&mut self, error: &DecodeError) -> Generation {
        self.clear();
        self.generation = self.generation.next();
        warn!(generation = %self.generation, "Selected file rejected: {}", error);
        self.transition(SessionPhase::Idle);
        self.generation
    }

    /// Apply a crop selector update produced for `generation`.
    ///
    /// Returns false when the event was dropped.
    pub fn apply_crop_event(&mut self, generation: Generation, event: CropEvent) -> bool {
        if generation != self.generation {
            debug!(
                event_generation = %generation,
                generation = %self.generation,
                "Dropping crop event for previous image"
            );
            return false;
        }
        if !self.phase.accepts_crop() {
            debug!(phase = %self.phase, "Ignoring crop event");
            return false;
        }
        let Some(display) = self.image.as_ref().map(RasterImage::display) else {
            return false;
        };

        match event {
            CropEvent::Live(percent) => {
                self.live_crop = Some(percent);
            }
            CropEvent::Completed(rect) => {
                debug!(generation = %self.generation, crop = %rect, "Crop completed");
                self.live_crop = Some(rect.to_percent(display));
                self.completed_crop = Some(rect);
            }
        }
        self.transition(SessionPhase::CropPending);
        true
    }

    /// Start a submission: rasterize the completed crop and enter `Submitting`.
    ///
    /// Returns `Ok(None)` without side effects when no submission may start
    /// (no completed crop, or one already in flight). A rasterization
    /// failure returns the session to `CropPending`.
    pub fn begin_submit(&mut self) -> RasterizationResult<Option<SubmitTicket>> {
        if !self.can_submit() {
            debug!(phase = %self.phase, "Identify trigger ignored");
            return Ok(None);
        }
        let (true, Some(crop)) = (self.image.is_some(), self.completed_crop) else {
            return Ok(None);
        };

        self.transition(SessionPhase::Submitting);
        let image = self.image.as_ref().expect("image presence checked above");
        match self.rasterizer.rasterize(image, &crop) {
            Ok(blob) => {
                info!(
                    generation = %self.generation,
                    bytes = blob.len(),
                    "Submitting crop"
                );
                Ok(Some(SubmitTicket {
                    generation: self.generation,
                    blob,
                }))
            }
            Err(e) => {
                warn!(generation = %self.generation, "Rasterization failed: {}", e);
                self.transition(SessionPhase::CropPending);
                Err(e)
            }
        }
    }

    /// Feed back the outcome of a submission started under `generation`.
    pub fn complete_submit(
        &mut self,
        generation: Generation,
        outcome: ClientResult<PredictionResult>,
    ) -> SubmitOutcome {
        if generation != self.generation || self.phase != SessionPhase::Submitting {
            info!(
                response_generation = %generation,
                generation = %self.generation,
                phase = %self.phase,
                "Discarding stale prediction response"
            );
            return SubmitOutcome::Stale;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result.clone());
                self.result_received_at = Some(Utc::now());
                self.transition(SessionPhase::ResultReady);
                SubmitOutcome::Applied(result)
            }
            Err(e) => {
                warn!(generation = %self.generation, "Prediction failed: {}", e);
                let notice = SessionNotice::prediction_failed(&e);
                self.result = None;
                self.failure = Some(notice.clone());
                self.transition(SessionPhase::Failed);
                SubmitOutcome::Failed(notice)
            }
        }
    }

    /// Dismiss the failure notice; image and crop are kept for a retry.
    pub fn acknowledge_failure(&mut self) -> Option<SessionNotice> {
        if self.phase != SessionPhase::Failed {
            return None;
        }
        self.transition(SessionPhase::CropPending);
        self.failure.take()
    }

    /// "Identify another": drop image, crop, and result.
    ///
    /// Only valid from `ResultReady`; a no-op that reports success in `Idle`.
    pub fn identify_another(&mut self) -> bool {
        match self.phase {
            SessionPhase::ResultReady => {
                self.clear();
                self.generation = self.generation.next();
                self.transition(SessionPhase::Idle);
                true
            }
            SessionPhase::Idle => true,
            _ => {
                debug!(phase = %self.phase, "Reset ignored");
                false
            }
        }
    }

    fn clear(&mut self) {
        self.image = None;
        self.live_crop = None;
        self.completed_crop = None;
        self.result = None;
        self.result_received_at = None;
        self.failure = None;
    }

    fn transition(&mut self, to: SessionPhase) {
        if self.phase != to {
            debug!(
                generation = %self.generation,
                from = %self.phase,
                to = %to,
                "Session transition"
            );
        }
        self.phase = to;
    }
}
