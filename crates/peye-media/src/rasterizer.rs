//! Crop rasterization.
//!
//! Maps a completed crop drawn on the displayed image back into natural pixel
//! space, resamples that region to the crop's displayed size, and encodes
//! it as JPEG. Output resolution always equals the displayed crop size, so
//! the zoom level of the display does not change what is uploaded.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, RgbImage};
use tracing::debug;

use peye_models::{CropRect, Dimensions, PixelRect, ScaleFactor};

use crate::error::{RasterizationError, RasterizationResult};
use crate::source::RasterImage;

/// MIME type of every blob produced here.
pub const RASTER_MIME: &str = "image/jpeg";

/// Rasterizer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RasterizerConfig {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Resampling filter used when source and output extents differ
    pub filter: FilterType,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 92, // browsers encode image/jpeg at 0.92 by default
            filter: FilterType::Triangle,
        }
    }
}

impl RasterizerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(format!(
                "JPEG quality must be in 1..=100, got {}",
                self.jpeg_quality
            ));
        }
        Ok(())
    }
}

/// Pixel geometry of one rasterization, computed before touching any pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterPlan {
    /// Region read from the natural-size image
    pub source: PixelRect,
    /// Size of the produced image
    pub output: Dimensions,
    /// Where the resampled source lands in the output.
    /// Equals the full output unless the crop overhangs the image edge.
    pub dest: PixelRect,
}

impl RasterPlan {
    /// Plan the extraction of `crop` (display coordinates) from `image`.
    pub fn compute(image: &RasterImage, crop: &CropRect) -> RasterizationResult<Self> {
        if crop.is_degenerate() {
            return Err(RasterizationError::ZeroArea(*crop));
        }

        // Surface dimensions truncate like an HTML canvas width/height attribute.
        let out_w = crop.width.trunc() as u32;
        let out_h = crop.height.trunc() as u32;
        if out_w == 0 || out_h == 0 {
            return Err(RasterizationError::ZeroArea(*crop));
        }
        // A selector never draws a rectangle larger than the image it sits on.
        let display = image.display();
        if out_w > display.width || out_h > display.height {
            return Err(RasterizationError::ExceedsDisplay {
                crop: *crop,
                display,
            });
        }
        let output = Dimensions {
            width: out_w,
            height: out_h,
        };

        let natural = image.natural();
        let scale = ScaleFactor::between(natural, display);

        let sx = crop.x * scale.x;
        let sy = crop.y * scale.y;
        let sw = crop.width * scale.x;
        let sh = crop.height * scale.y;

        let nat_w = natural.width as f64;
        let nat_h = natural.height as f64;

        let x0 = sx.max(0.0).round();
        let y0 = sy.max(0.0).round();
        let x1 = (sx + sw).min(nat_w).round();
        let y1 = (sy + sh).min(nat_h).round();

        if x1 <= x0 || y1 <= y0 {
            return Err(RasterizationError::OutsideImage {
                crop: *crop,
                natural,
            });
        }

        let source = PixelRect::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32);

        let overhangs = sx < 0.0 || sy < 0.0 || sx + sw > nat_w || sy + sh > nat_h;
        let dest = if overhangs {
            // Only the part of the crop covering the image is drawn; the rest stays black.
            let dx0 = ((x0 - sx) / scale.x).round().clamp(0.0, out_w as f64);
            let dy0 = ((y0 - sy) / scale.y).round().clamp(0.0, out_h as f64);
            let dx1 = ((x1 - sx) / scale.x).round().clamp(0.0, out_w as f64);
            let dy1 = ((y1 - sy) / scale.y).round().clamp(0.0, out_h as f64);
            PixelRect::new(
                dx0 as u32,
                dy0 as u32,
                ((dx1 - dx0) as u32).max(1),
                ((dy1 - dy0) as u32).max(1),
            )
        } else {
            PixelRect::new(0, 0, out_w, out_h)
        };

        Ok(Self {
            source,
            output,
            dest,
        })
    }

    /// True when the resampled source fills the whole output.
    pub fn is_full_cover(&self) -> bool {
        self.dest == PixelRect::new(0, 0, self.output.width, self.output.height)
    }
}

/// Encoded crop ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBlob {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
}

impl RasterBlob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Crops, resamples, and encodes regions of a [`RasterImage`].
#[derive(Debug, Clone, Default)]
pub struct CropRasterizer {
    config: RasterizerConfig,
}

impl CropRasterizer {
    pub fn new(config: RasterizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RasterizerConfig {
        &self.config
    }

    /// Produce a JPEG of exactly the cropped region at the crop's display size.
    pub fn rasterize(
        &self,
        image: &RasterImage,
        crop: &CropRect,
    ) -> RasterizationResult<RasterBlob> {
        let plan = RasterPlan::compute(image, crop)?;
        let pixels = self.render(image, &plan);
        let bytes = self.encode(&pixels)?;

        debug!(
            crop = %crop,
            source_x = plan.source.x,
            source_y = plan.source.y,
            source_w = plan.source.width,
            source_h = plan.source.height,
            output = %plan.output,
            bytes = bytes.len(),
            "Crop rasterized"
        );

        Ok(RasterBlob {
            bytes,
            width: plan.output.width,
            height: plan.output.height,
            mime: RASTER_MIME,
        })
    }

    /// Crop and resample according to `plan`, without encoding.
    pub fn render(&self, image: &RasterImage, plan: &RasterPlan) -> RgbImage {
        let src = plan.source;
        let region = image.pixels().crop_imm(src.x, src.y, src.width, src.height);

        let resampled = if src.width == plan.dest.width && src.height == plan.dest.height {
            region.to_rgb8()
        } else {
            region
                .resize_exact(plan.dest.width, plan.dest.height, self.config.filter)
                .to_rgb8()
        };

        if plan.is_full_cover() {
            return resampled;
        }

        let mut canvas = RgbImage::new(plan.output.width, plan.output.height);
        imageops::replace(
            &mut canvas,
            &resampled,
            plan.dest.x as i64,
            plan.dest.y as i64,
        );
        canvas
    }

    fn encode(&self, pixels: &RgbImage) -> RasterizationResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.config.jpeg_quality);
        encoder.encode(
            pixels.as_raw(),
            pixels.width(),
            pixels.height(),
            ColorType::Rgb8,
        )?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, Rgb};

    const RED: Rgb<u8> = Rgb([220, 20, 20]);
    const BLUE: Rgb<u8> = Rgb([20, 20, 220]);

    /// Natural image filled blue with a red square at `red`.
    fn image_with_red_square(
        natural: (u32, u32),
        display: (u32, u32),
        red: PixelRect,
    ) -> RasterImage {
        let img = RgbImage::from_fn(natural.0, natural.1, |x, y| {
            let inside =
                x >= red.x && x < red.x + red.width && y >= red.y && y < red.y + red.height;
            if inside {
                RED
            } else {
                BLUE
            }
        });
        let display = Dimensions::try_new(display.0, display.1).unwrap();
        RasterImage::from_pixels(DynamicImage::ImageRgb8(img), display).unwrap()
    }

    fn uniform_image(natural: (u32, u32), display: (u32, u32)) -> RasterImage {
        image_with_red_square(natural, display, PixelRect::new(0, 0, 0, 0))
    }

    fn is_reddish(p: &Rgb<u8>) -> bool {
        p[0] > 150 && p[2] < 100
    }

    #[test]
    fn test_plan_uniform_scale() {
        // 2000x2000 shown at 500x500
        let image = uniform_image((2000, 2000), (500, 500));
        let crop = CropRect::new(50.0, 50.0, 100.0, 100.0);
        let plan = RasterPlan::compute(&image, &crop).unwrap();

        assert_eq!(plan.source, PixelRect::new(200, 200, 400, 400));
        assert_eq!(plan.output, Dimensions { width: 100, height: 100 });
        assert!(plan.is_full_cover());
    }

    #[test]
    fn test_plan_scales_each_axis_by_k() {
        for k in [1u32, 2, 3, 5] {
            let image = uniform_image((120 * k, 80 * k), (120, 80));
            let crop = CropRect::new(10.0, 7.0, 33.0, 21.0);
            let plan = RasterPlan::compute(&image, &crop).unwrap();

            assert_eq!(plan.source.x, 10 * k);
            assert_eq!(plan.source.y, 7 * k);
            assert_eq!(plan.source.width, 33 * k);
            assert_eq!(plan.source.height, 21 * k);
            assert_eq!(plan.output, Dimensions { width: 33, height: 21 });
        }
    }

    #[test]
    fn test_plan_fractional_crop_within_one_pixel() {
        let image = uniform_image((1500, 1500), (400, 400));
        let crop = CropRect::new(12.3, 45.6, 100.9, 100.9);
        let plan = RasterPlan::compute(&image, &crop).unwrap();
        let k = 1500.0 / 400.0;

        assert!((plan.source.x as f64 - 12.3 * k).abs() <= 1.0);
        assert!((plan.source.y as f64 - 45.6 * k).abs() <= 1.0);
        assert!((plan.source.width as f64 - 100.9 * k).abs() <= 1.0);
        assert_eq!(plan.output, Dimensions { width: 100, height: 100 });
    }

    #[test]
    fn test_plan_rejects_degenerate_crops() {
        let image = uniform_image((100, 100), (100, 100));

        let zero = CropRect::new(10.0, 10.0, 0.0, 20.0);
        assert!(matches!(
            RasterPlan::compute(&image, &zero),
            Err(RasterizationError::ZeroArea(_))
        ));

        let sub_pixel = CropRect::new(10.0, 10.0, 0.5, 20.0);
        assert!(matches!(
            RasterPlan::compute(&image, &sub_pixel),
            Err(RasterizationError::ZeroArea(_))
        ));

        let outside = CropRect::new(150.0, 150.0, 20.0, 20.0);
        assert!(matches!(
            RasterPlan::compute(&image, &outside),
            Err(RasterizationError::OutsideImage { .. })
        ));
    }

    #[test]
    fn test_plan_rejects_crop_larger_than_display() {
        let image = uniform_image((100, 100), (100, 100));

        let huge = CropRect::new(0.0, 0.0, 1e10, 1e10);
        assert!(matches!(
            RasterPlan::compute(&image, &huge),
            Err(RasterizationError::ExceedsDisplay { .. })
        ));

        let one_axis = CropRect::new(0.0, 0.0, 50.0, 101.0);
        assert!(matches!(
            RasterPlan::compute(&image, &one_axis),
            Err(RasterizationError::ExceedsDisplay { .. })
        ));

        let full = CropRect::new(0.0, 0.0, 100.9, 100.9);
        let plan = RasterPlan::compute(&image, &full).unwrap();
        assert_eq!(plan.output, Dimensions { width: 100, height: 100 });
    }

    #[test]
    fn test_plan_overhang_is_clipped() {
        let image = uniform_image((200, 200), (100, 100));
        let crop = CropRect::new(80.0, 0.0, 40.0, 40.0);
        let plan = RasterPlan::compute(&image, &crop).unwrap();

        assert_eq!(plan.source, PixelRect::new(160, 0, 40, 80));
        assert_eq!(plan.output, Dimensions { width: 40, height: 40 });
        assert_eq!(plan.dest, PixelRect::new(0, 0, 20, 40));
        assert!(!plan.is_full_cover());
    }

    #[test]
    fn test_rasterize_extracts_natural_region() {
        // Red square occupies exactly the natural region the crop maps to.
        let red = PixelRect::new(200, 200, 400, 400);
        let image = image_with_red_square((2000, 2000), (500, 500), red);
        let rasterizer = CropRasterizer::default();
        let crop = CropRect::new(50.0, 50.0, 100.0, 100.0);

        let blob = rasterizer.rasterize(&image, &crop).unwrap();
        assert_eq!(blob.mime, "image/jpeg");
        assert_eq!((blob.width, blob.height), (100, 100));

        let decoded = image::load_from_memory(&blob.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (100, 100));

        let rgb = decoded.to_rgb8();
        for (x, y) in [(5, 5), (50, 50), (94, 94), (5, 94)] {
            assert!(is_reddish(rgb.get_pixel(x, y)), "pixel ({x},{y}) should be red");
        }
    }

    #[test]
    fn test_output_size_independent_of_natural_size() {
        let rasterizer = CropRasterizer::default();
        let crop = CropRect::new(20.0, 30.0, 64.0, 48.0);

        for natural in [(200, 200), (800, 800), (3000, 3000)] {
            let image = uniform_image(natural, (200, 200));
            let blob = rasterizer.rasterize(&image, &crop).unwrap();
            assert_eq!((blob.width, blob.height), (64, 48));

            let decoded = image::load_from_memory(&blob.bytes).unwrap();
            assert_eq!(decoded.dimensions(), (64, 48));
        }
    }

    #[test]
    fn test_render_overhang_leaves_black_margin() {
        let image = uniform_image((200, 200), (100, 100));
        let rasterizer = CropRasterizer::default();
        let crop = CropRect::new(80.0, 0.0, 40.0, 40.0);
        let plan = RasterPlan::compute(&image, &crop).unwrap();

        let pixels = rasterizer.render(&image, &plan);
        assert_eq!(pixels.dimensions(), (40, 40));
        let inside = pixels.get_pixel(5, 5);
        assert!(inside[2] > 200 && inside[0] < 40, "covered area keeps source color");
        assert_eq!(*pixels.get_pixel(35, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_config_validation() {
        assert!(RasterizerConfig::default().validate().is_ok());
        let bad = RasterizerConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
