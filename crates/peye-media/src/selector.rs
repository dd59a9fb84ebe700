//! Crop selector contract and initial-rectangle policy.
//!
//! The interactive drag/resize widget lives in the UI layer. This module
//! only defines what it must produce when an image is first shown.

use peye_models::{AspectRatio, Dimensions, PercentCrop};

/// Share of the limiting dimension covered by the initial crop.
pub const DEFAULT_INITIAL_COVERAGE: f64 = 90.0;

/// Crop selector settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorConfig {
    /// Required width:height of every crop
    pub aspect: AspectRatio,
    /// Percentage of the largest fitting rectangle used for the initial crop
    pub initial_coverage_percent: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            aspect: AspectRatio::SQUARE,
            initial_coverage_percent: DEFAULT_INITIAL_COVERAGE,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), String> {
        AspectRatio::try_new(self.aspect.width, self.aspect.height).map_err(|e| e.to_string())?;
        if !(self.initial_coverage_percent > 0.0 && self.initial_coverage_percent <= 100.0) {
            return Err(format!(
                "Initial coverage must be in (0, 100], got {}",
                self.initial_coverage_percent
            ));
        }
        Ok(())
    }
}

/// An interactive crop widget.
///
/// Attached once per loaded image; returns the rectangle it starts with.
/// Subsequent updates reach the session as [`peye_models::CropEvent`]s.
pub trait CropSelector {
    fn attach(&mut self, display: Dimensions, aspect: AspectRatio) -> PercentCrop;
}

/// Selector that starts with a centered rectangle at a fixed coverage.
#[derive(Debug, Clone, Copy)]
pub struct CenteredSelector {
    coverage_percent: f64,
}

impl CenteredSelector {
    pub fn new(coverage_percent: f64) -> Self {
        Self { coverage_percent }
    }
}

impl Default for CenteredSelector {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_COVERAGE)
    }
}

impl CropSelector for CenteredSelector {
    fn attach(&mut self, display: Dimensions, aspect: AspectRatio) -> PercentCrop {
        centered_aspect_crop(display, aspect, self.coverage_percent)
    }
}

/// Centered rectangle with the given aspect covering `coverage_percent` of
/// the largest such rectangle that fits `display`.
pub fn centered_aspect_crop(
    display: Dimensions,
    aspect: AspectRatio,
    coverage_percent: f64,
) -> PercentCrop {
    let dw = display.width as f64;
    let dh = display.height as f64;
    let ratio = aspect.ratio();

    // Largest fitting rectangle is bounded by whichever side is short relative to the aspect.
    let (fit_w, fit_h) = if dw / dh > ratio {
        (dh * ratio, dh)
    } else {
        (dw, dw / ratio)
    };

    let coverage = coverage_percent / 100.0;
    let width = fit_w * coverage / dw * 100.0;
    let height = fit_h * coverage / dh * 100.0;

    PercentCrop {
        x: (100.0 - width) / 2.0,
        y: (100.0 - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions::try_new(width, height).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_square_on_square_display() {
        let crop = centered_aspect_crop(dims(500, 500), AspectRatio::SQUARE, 90.0);
        assert!(approx(crop.width, 90.0));
        assert!(approx(crop.height, 90.0));
        assert!(approx(crop.x, 5.0));
        assert!(approx(crop.y, 5.0));
    }

    #[test]
    fn test_square_on_landscape_display() {
        let display = dims(800, 400);
        let crop = centered_aspect_crop(display, AspectRatio::SQUARE, 90.0);
        let px = crop.to_pixels(display);

        assert!(approx(px.width, 360.0));
        assert!(approx(px.height, 360.0));
        assert!(approx(px.x, 220.0));
        assert!(approx(px.y, 20.0));
        assert!(crop.is_valid());
    }

    #[test]
    fn test_square_on_portrait_display() {
        let display = dims(300, 400);
        let px = centered_aspect_crop(display, AspectRatio::SQUARE, 90.0).to_pixels(display);

        assert!(approx(px.width, 270.0));
        assert!(approx(px.height, 270.0));
        assert!(approx(px.x, 15.0));
        assert!(approx(px.y, 65.0));
    }

    #[test]
    fn test_widescreen_aspect_respected() {
        let display = dims(400, 400);
        let widescreen = AspectRatio::try_new(16, 9).unwrap();
        let px = centered_aspect_crop(display, widescreen, 90.0).to_pixels(display);
        assert!(approx(px.width / px.height, 16.0 / 9.0));
        assert!(approx(px.width, 360.0));
    }

    #[test]
    fn test_centered_selector_attach() {
        let mut selector = CenteredSelector::default();
        let crop = selector.attach(dims(640, 480), AspectRatio::SQUARE);
        assert!(crop.is_valid());
        assert!(approx(crop.x + crop.width / 2.0, 50.0));
        assert!(approx(crop.y + crop.height / 2.0, 50.0));
    }

    #[test]
    fn test_config_validation() {
        assert!(SelectorConfig::default().validate().is_ok());
        let bad = SelectorConfig {
            initial_coverage_percent: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let flat = SelectorConfig {
            aspect: AspectRatio {
                width: 4,
                height: 0,
            },
            ..Default::default()
        };
        assert!(flat.validate().unwrap_err().contains("4:0"));
    }
}
