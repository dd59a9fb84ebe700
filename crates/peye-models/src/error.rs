//! Model error types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Malformed prediction response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Aspect ratio sides must be positive, got {width}:{height}")]
    InvalidAspect { width: u32, height: u32 },
}
