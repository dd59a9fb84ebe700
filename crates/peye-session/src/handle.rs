//! Single-threaded driver for a [`Session`].
//!
//! Connects the state machine to the image source, the crop selector, the
//! prediction service, and the notifier. All methods take `&self`, so a UI
//! event loop can keep feeding events while an `identify` call is awaiting
//! the network. The session borrow is never held across an await point.

use std::cell::{Ref, RefCell};

use tracing::{info_span, warn, Instrument};

use peye_client::Predictor;
use peye_media::{CenteredSelector, CropRasterizer, CropSelector, ImageSource, RasterizationError};
use peye_models::{AspectRatio, CropEvent, CropRect, Generation, PercentCrop, PredictionResult};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::notice::{LogNotifier, Notifier, SessionNotice};
use crate::state::{Session, SubmitOutcome};
use crate::view::SessionView;

/// Result of one identify trigger.
#[derive(Debug)]
pub enum IdentifyOutcome {
    /// Nothing to submit, or a submission was already in flight
    Ignored,
    /// The crop could not be rasterized; no request was sent
    RasterizationFailed(RasterizationError),
    /// Prediction stored as the session result
    Completed(PredictionResult),
    /// Prediction failed; the notice was shown and acknowledged
    Failed(SessionNotice),
    /// The response arrived after the session moved on and was dropped
    Stale,
}

impl IdentifyOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, IdentifyOutcome::Completed(_))
    }
}

/// Drives one identification session.
pub struct SessionHandle<P, N = LogNotifier, S = CenteredSelector> {
    session: RefCell<Session>,
    source: ImageSource,
    selector: RefCell<S>,
    aspect: AspectRatio,
    predictor: P,
    notifier: N,
}

impl<P: Predictor, N: Notifier> SessionHandle<P, N, CenteredSelector> {
    /// Create a handle with the centered initial-crop policy.
    pub fn new(config: SessionConfig, predictor: P, notifier: N) -> SessionResult<Self> {
        let selector = CenteredSelector::new(config.selector.initial_coverage_percent);
        Self::with_selector(config, predictor, notifier, selector)
    }
}

impl<P: Predictor, N: Notifier, S: CropSelector> SessionHandle<P, N, S> {
    pub fn with_selector(
        config: SessionConfig,
        predictor: P,
        notifier: N,
        selector: S,
    ) -> SessionResult<Self> {
        config.validate().map_err(SessionError::Config)?;

        Ok(Self {
            session: RefCell::new(Session::new(CropRasterizer::new(config.rasterizer))),
            source: ImageSource::new(config.layout),
            selector: RefCell::new(selector),
            aspect: config.selector.aspect,
            predictor,
            notifier,
        })
    }

    /// Decode a selected file and start a new generation around it.
    ///
    /// The selector is attached to the new display size and its initial
    /// rectangle is applied as a live crop. A file that fails to decode
    /// resets the session to `Idle`.
    pub fn select_file(&self, bytes: &[u8]) -> SessionResult<Generation> {
        let image = match self.source.load(bytes) {
            Ok(image) => image,
            Err(e) => {
                self.session.borrow_mut().decode_failed(&e);
                return Err(e.into());
            }
        };

        let display = image.display();
        let mut session = self.session.borrow_mut();
        let generation = session.load_image(image);
        let initial = self.selector.borrow_mut().attach(display, self.aspect);
        session.apply_crop_event(generation, CropEvent::Live(initial));
        Ok(generation)
    }

    /// In-progress crop update from the selector.
    pub fn crop_changed(&self, generation: Generation, crop: PercentCrop) -> bool {
        self.session
            .borrow_mut()
            .apply_crop_event(generation, CropEvent::Live(crop))
    }

    /// Finalized crop from the selector, in display pixels.
    pub fn crop_completed(&self, generation: Generation, crop: CropRect) -> bool {
        self.session
            .borrow_mut()
            .apply_crop_event(generation, CropEvent::Completed(crop))
    }

    /// Rasterize the completed crop and ask the predictor about it.
    pub async fn identify(&self) -> IdentifyOutcome {
        let ticket = match self.session.borrow_mut().begin_submit() {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return IdentifyOutcome::Ignored,
            Err(e) => return IdentifyOutcome::RasterizationFailed(e),
        };

        let span = info_span!(
            "identify",
            generation = %ticket.generation,
            bytes = ticket.blob.len()
        );
        let response = self.predictor.predict(&ticket.blob).instrument(span).await;

        let outcome = self
            .session
            .borrow_mut()
            .complete_submit(ticket.generation, response);

        match outcome {
            SubmitOutcome::Applied(result) => IdentifyOutcome::Completed(result),
            SubmitOutcome::Stale => IdentifyOutcome::Stale,
            SubmitOutcome::Failed(notice) => {
                self.notifier.notify(&notice);
                if self.session.borrow_mut().acknowledge_failure().is_none() {
                    warn!("Failure notice was already cleared");
                }
                IdentifyOutcome::Failed(notice)
            }
        }
    }

    /// Return to `Idle` after a result. See [`Session::identify_another`].
    pub fn identify_another(&self) -> bool {
        self.session.borrow_mut().identify_another()
    }

    /// Read-only access to the underlying session.
    pub fn session(&self) -> Ref<'_, Session> {
        self.session.borrow()
    }

    pub fn generation(&self) -> Generation {
        self.session.borrow().generation()
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> SessionView {
        SessionView::from_session(&self.session.borrow())
    }
}
