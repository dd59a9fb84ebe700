//! Error types for decoding and rasterization.

use peye_models::{CropRect, Dimensions, ModelError};
use thiserror::Error;

/// Result type for image decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for crop rasterization.
pub type RasterizationResult<T> = Result<T, RasterizationError>;

/// The selected file could not be turned into an image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Selected file is empty")]
    Empty,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Image decoding failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Decoded image has no pixels: {0}")]
    InvalidDimensions(#[from] ModelError),
}

/// The crop could not be turned into an output raster.
#[derive(Debug, Error)]
pub enum RasterizationError {
    #[error("Crop has zero area: {0}")]
    ZeroArea(CropRect),

    #[error("Crop {crop} is larger than the {display} displayed image")]
    ExceedsDisplay { crop: CropRect, display: Dimensions },

    #[error("Crop {crop} lies outside the {natural} image")]
    OutsideImage { crop: CropRect, natural: Dimensions },

    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
