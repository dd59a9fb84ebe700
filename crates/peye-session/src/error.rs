//! Session error types.

use thiserror::Error;

use peye_client::PredictionError;
use peye_media::{DecodeError, RasterizationError};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Rasterization error: {0}")]
    Rasterization(#[from] RasterizationError),

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
