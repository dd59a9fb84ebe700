//! Prediction client error types.

use peye_models::ModelError;
use thiserror::Error;

/// Message shown to the user for any failed submission.
pub const USER_FACING_FAILURE: &str = "Failed to connect to the server.";

pub type ClientResult<T> = Result<T, PredictionError>;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Prediction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] ModelError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PredictionError {
    /// True when the service could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, PredictionError::Network(_))
    }

    /// Generic text for a blocking notification. The cause is never assumed.
    pub fn user_message(&self) -> &'static str {
        USER_FACING_FAILURE
    }
}
