//! Shared data models for the Python Eye identification client.
//!
//! This crate provides Serde-serializable types for:
//! - Aspect ratios used by the crop selector
//! - Display/natural dimensions and the crop rectangles drawn on top of them
//! - Classification results returned by the prediction service
//! - Session phases and generation tags

pub mod aspect;
pub mod error;
pub mod prediction;
pub mod rect;
pub mod session;

// Re-export common types
pub use aspect::AspectRatio;
pub use error::{ModelError, ModelResult};
pub use prediction::{Prediction, PredictionResult};
pub use rect::{CropRect, Dimensions, PercentCrop, PixelRect, ScaleFactor};
pub use session::{CropEvent, Generation, SessionPhase};
