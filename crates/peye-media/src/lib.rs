//! Image handling for the identification client.
//!
//! This crate provides:
//! - Decoding of user-selected files into displayable raster images
//! - The crop selector's initial-rectangle policy
//! - Rasterization of a completed crop into a JPEG blob

pub mod error;
pub mod rasterizer;
pub mod selector;
pub mod source;

pub use error::{DecodeError, DecodeResult, RasterizationError, RasterizationResult};
pub use rasterizer::{CropRasterizer, RasterBlob, RasterPlan, RasterizerConfig};
pub use selector::{centered_aspect_crop, CenteredSelector, CropSelector, SelectorConfig};
pub use source::{DecodedImage, DisplayLayout, ImageSource, RasterImage};
