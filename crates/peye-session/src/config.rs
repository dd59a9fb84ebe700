//! Session configuration.

use peye_media::{DisplayLayout, RasterizerConfig, SelectorConfig};

/// Settings for one identification session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Aspect constraint and initial crop coverage
    pub selector: SelectorConfig,
    /// How large the uploaded image is rendered
    pub layout: DisplayLayout,
    /// Output encoding of the cropped region
    pub rasterizer: RasterizerConfig,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.selector.validate()?;
        self.rasterizer.validate()?;
        if self.layout.max_width == Some(0) || self.layout.max_height == Some(0) {
            return Err("Display limits must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peye_models::AspectRatio;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.selector.aspect, AspectRatio::SQUARE);
        assert_eq!(config.selector.initial_coverage_percent, 90.0);
        assert_eq!(config.layout.max_height, Some(400));
        assert_eq!(config.rasterizer.jpeg_quality, 92);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_display_limit() {
        let mut config = SessionConfig::default();
        config.layout.max_height = Some(0);
        assert!(config.validate().is_err());
    }
}
