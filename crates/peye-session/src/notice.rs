//! User-visible notifications.

use tracing::warn;

use peye_client::PredictionError;

/// What a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The prediction request failed
    PredictionFailed,
}

/// A blocking message for the user, plus detail for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNotice {
    pub kind: NoticeKind,
    /// Generic text safe to show to the user
    pub message: String,
    /// Underlying cause, for logs only
    pub detail: String,
}

impl SessionNotice {
    pub fn prediction_failed(error: &PredictionError) -> Self {
        Self {
            kind: NoticeKind::PredictionFailed,
            message: error.user_message().to_string(),
            detail: error.to_string(),
        }
    }
}

/// Presents notices to the user.
///
/// `notify` returns once the user has dismissed the notice.
pub trait Notifier {
    fn notify(&self, notice: &SessionNotice);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: &SessionNotice) {
        warn!(kind = ?notice.kind, detail = %notice.detail, "{}", notice.message);
    }
}
