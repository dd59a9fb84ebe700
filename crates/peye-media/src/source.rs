//! Decoding of user-selected files into displayable raster images.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::debug;

use peye_models::Dimensions;

use crate::error::{DecodeError, DecodeResult};

/// Maximum rendered height of the uploaded image, in CSS pixels.
pub const DEFAULT_MAX_DISPLAY_HEIGHT: u32 = 400;

/// Rules for sizing the rendered image on screen.
///
/// Images are only ever scaled down, preserving their aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLayout {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            max_width: None,
            max_height: Some(DEFAULT_MAX_DISPLAY_HEIGHT),
        }
    }
}

impl DisplayLayout {
    /// Unconstrained layout: display size equals natural size.
    pub fn natural() -> Self {
        Self {
            max_width: None,
            max_height: None,
        }
    }

    /// Compute the displayed size of an image with the given natural size.
    pub fn fit(&self, natural: Dimensions) -> Dimensions {
        let mut scale: f64 = 1.0;
        if let Some(max_w) = self.max_width {
            scale = scale.min(max_w as f64 / natural.width as f64);
        }
        if let Some(max_h) = self.max_height {
            scale = scale.min(max_h as f64 / natural.height as f64);
        }

        Dimensions {
            width: ((natural.width as f64 * scale).round() as u32).max(1),
            height: ((natural.height as f64 * scale).round() as u32).max(1),
        }
    }
}

/// A decoded file that has not been laid out yet.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: Arc<DynamicImage>,
    natural: Dimensions,
    mime: &'static str,
    data_uri: Arc<str>,
}

impl DecodedImage {
    pub fn natural(&self) -> Dimensions {
        self.natural
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// `data:` URI of the original file bytes.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Attach display dimensions computed by `layout`.
    pub fn into_raster(self, layout: &DisplayLayout) -> RasterImage {
        let display = layout.fit(self.natural);
        RasterImage {
            pixels: self.pixels,
            natural: self.natural,
            display,
            mime: self.mime,
            data_uri: self.data_uri,
        }
    }
}

/// A decoded image together with its natural and rendered sizes.
///
/// Immutable once created. Cloning is cheap; pixel data is shared.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: Arc<DynamicImage>,
    natural: Dimensions,
    display: Dimensions,
    mime: &'static str,
    data_uri: Arc<str>,
}

impl RasterImage {
    /// Wrap pixels that were decoded elsewhere, rendered at `display`.
    ///
    /// No source file exists, so the data URI is empty.
    pub fn from_pixels(pixels: DynamicImage, display: Dimensions) -> DecodeResult<Self> {
        let (width, height) = pixels.dimensions();
        let natural = Dimensions::try_new(width, height)?;
        Ok(Self {
            pixels: Arc::new(pixels),
            natural,
            display,
            mime: "application/octet-stream",
            data_uri: Arc::from(""),
        })
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Pixel size of the original asset.
    pub fn natural(&self) -> Dimensions {
        self.natural
    }

    /// Size the image is rendered at on screen.
    pub fn display(&self) -> Dimensions {
        self.display
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}

/// Loads user-selected files.
#[derive(Debug, Clone, Default)]
pub struct ImageSource {
    layout: DisplayLayout,
}

impl ImageSource {
    pub fn new(layout: DisplayLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &DisplayLayout {
        &self.layout
    }

    /// Decode `bytes` and lay the result out for display.
    pub fn load(&self, bytes: &[u8]) -> DecodeResult<RasterImage> {
        let decoded = decode(bytes)?;
        let image = decoded.into_raster(&self.layout);
        debug!(
            natural = %image.natural(),
            display = %image.display(),
            mime = image.mime(),
            "Image loaded"
        );
        Ok(image)
    }
}

/// Decode raw file bytes, sniffing the format from content.
pub fn decode(bytes: &[u8]) -> DecodeResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
    let pixels = image::load_from_memory_with_format(bytes, format)?;
    let (width, height) = pixels.dimensions();
    let natural = Dimensions::try_new(width, height)?;

    let mime = mime_for(format);
    let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));

    Ok(DecodedImage {
        pixels: Arc::new(pixels),
        natural,
        mime,
        data_uri: Arc::from(data_uri),
    })
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => "application/octet-stream",
    }
}
