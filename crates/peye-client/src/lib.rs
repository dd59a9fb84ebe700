//! Client for the Python species-classification service.
//!
//! Uploads a rasterized crop as a single multipart file and parses the
//! classification it returns. One attempt per call: no retries, no timeout
//! beyond the transport default unless configured.

pub mod client;
pub mod error;

pub use client::{PredictionClient, PredictionClientConfig, Predictor};
pub use error::{ClientResult, PredictionError};
