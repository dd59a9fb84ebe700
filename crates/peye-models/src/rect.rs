//! Dimensions and rectangles in display, percent, and natural pixel space.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, ModelResult};

/// Width and height of an image in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions, rejecting zero-sized extents.
    pub fn try_new(width: u32, height: u32) -> ModelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ModelError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Ratio between an image's natural size and its rendered size.
///
/// Derived on demand, never stored alongside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactor {
    /// `natural / display` on each axis.
    pub fn between(natural: Dimensions, display: Dimensions) -> Self {
        Self {
            x: natural.width as f64 / display.width as f64,
            y: natural.height as f64 / display.height as f64,
        }
    }

    /// True when the display is scaled down from natural size on both axes.
    pub fn is_downscale(&self) -> bool {
        self.x >= 1.0 && self.y >= 1.0
    }
}

/// A finalized crop rectangle in display pixel coordinates.
///
/// Values may be fractional; they are only meaningful relative to the display
/// dimensions of the image they were drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Create a new crop rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True for zero-area, negative, or non-finite rectangles.
    pub fn is_degenerate(&self) -> bool {
        let finite = self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite();
        !finite || self.width <= 0.0 || self.height <= 0.0
    }

    /// Express the rectangle as percentages of `display`.
    pub fn to_percent(&self, display: Dimensions) -> PercentCrop {
        let w = display.width as f64;
        let h = display.height as f64;
        PercentCrop {
            x: self.x / w * 100.0,
            y: self.y / h * 100.0,
            width: self.width / w * 100.0,
            height: self.height / h * 100.0,
        }
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}x{:.1}@({:.1},{:.1})",
            self.width, self.height, self.x, self.y
        )
    }
}

/// A crop rectangle expressed as percentages (0-100) of the displayed image.
///
/// This is the form emitted continuously while the user drags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PercentCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentCrop {
    /// Create a new percent crop.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check the rectangle lies within 0-100 on both axes.
    pub fn is_valid(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= 100.001 // Allow small epsilon for float precision
            && self.y + self.height <= 100.001
    }

    /// Convert to display pixels for an image rendered at `display`.
    pub fn to_pixels(&self, display: Dimensions) -> CropRect {
        let w = display.width as f64;
        let h = display.height as f64;
        CropRect {
            x: self.x * w / 100.0,
            y: self.y * h / 100.0,
            width: self.width * w / 100.0,
            height: self.height * h / 100.0,
        }
    }
}

/// A rectangle in natural (source asset) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}
