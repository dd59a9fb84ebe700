//! Session state machine for the identification client.
//!
//! This crate provides:
//! - [`Session`], the single-owner state machine for upload, crop, submit,
//!   result, and reset
//! - [`SessionHandle`], a single-threaded driver wiring the state machine to
//!   the image source, crop selector, and prediction service
//! - Generation tagging so late responses never overwrite a newer session
//! - A render-ready [`SessionView`] and user-visible notices
//! - Tracing setup

pub mod config;
pub mod error;
pub mod handle;
pub mod notice;
pub mod state;
pub mod telemetry;
pub mod view;

pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use handle::{IdentifyOutcome, SessionHandle};
pub use notice::{LogNotifier, NoticeKind, Notifier, SessionNotice};
pub use state::{Session, SubmitOutcome, SubmitTicket};
pub use telemetry::{init_tracing, LogConfig, LogFormat, TelemetryError};
pub use view::{AlternativeLine, ResultCard, SessionView};
