//! Engine configuration.
//!
//! All tunables the editor exposes to its host: preview width, export quality
//! and the slider ranges used to clamp incoming parameter values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum preview width in pixels.
pub const DEFAULT_MAX_PREVIEW_WIDTH: u32 = 800;

/// Default quality for lossy export formats (0.0 to 1.0).
pub const DEFAULT_EXPORT_ENCODE_QUALITY: f32 = 0.92;

/// Default canvas ceiling, in pixels (100 megapixels).
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 100_000_000;

/// The contrast slider position that maps to an unchanged image.
///
/// Slider values are shifted by this amount before entering the contrast
/// formula, so the formula's neutral input of 0 lines up with the default.
pub const CONTRAST_NEUTRAL: f32 = 100.0;

/// The contrast formula has a pole at an effective value of 259.
const CONTRAST_POLE: f32 = 259.0;

/// Errors raised by [`EngineConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A range has min above max or a non-finite bound.
    #[error("Invalid {name} range: {min}..={max}")]
    InvalidRange { name: &'static str, min: f32, max: f32 },

    /// The contrast range would reach the formula's singularity.
    #[error("Contrast range {min}..={max} reaches the contrast formula's pole")]
    DegenerateContrast { min: f32, max: f32 },

    /// Preview width must be at least one pixel.
    #[error("max_preview_width must be non-zero")]
    ZeroPreviewWidth,

    /// Quality must be in (0, 1].
    #[error("export_encode_quality must be in (0, 1], got {0}")]
    InvalidQuality(f32),

    /// Canvas ceiling must allow at least one pixel.
    #[error("max_canvas_pixels must be non-zero")]
    ZeroCanvasLimit,
}

/// Inclusive numeric range for a slider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Named, overridable options for the editing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Previews are rendered at `min(1, max_preview_width / source_width)`.
    pub max_preview_width: u32,
    /// Quality for lossy export formats, 0.0 to 1.0.
    pub export_encode_quality: f32,
    /// Brightness slider range (percent).
    pub brightness_range: SliderRange,
    /// Contrast slider range.
    pub contrast_range: SliderRange,
    /// Saturation slider range (percent).
    pub saturation_range: SliderRange,
    /// Largest canvas the transform engine will allocate.
    pub max_canvas_pixels: u64,
    /// Apply EXIF orientation when decoding sources.
    pub apply_exif_orientation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_preview_width: DEFAULT_MAX_PREVIEW_WIDTH,
            export_encode_quality: DEFAULT_EXPORT_ENCODE_QUALITY,
            brightness_range: SliderRange::new(50.0, 150.0),
            contrast_range: SliderRange::new(50.0, 150.0),
            saturation_range: SliderRange::new(0.0, 200.0),
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
            apply_exif_orientation: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_preview_width(mut self, width: u32) -> Self {
        self.max_preview_width = width;
        self
    }

    pub fn with_export_encode_quality(mut self, quality: f32) -> Self {
        self.export_encode_quality = quality;
        self
    }

    pub fn with_brightness_range(mut self, range: SliderRange) -> Self {
        self.brightness_range = range;
        self
    }

    pub fn with_contrast_range(mut self, range: SliderRange) -> Self {
        self.contrast_range = range;
        self
    }

    pub fn with_saturation_range(mut self, range: SliderRange) -> Self {
        self.saturation_range = range;
        self
    }

    pub fn with_max_canvas_pixels(mut self, pixels: u64) -> Self {
        self.max_canvas_pixels = pixels;
        self
    }

    pub fn with_exif_orientation(mut self, enabled: bool) -> Self {
        self.apply_exif_orientation = enabled;
        self
    }

    /// Check that every option is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_preview_width == 0 {
            return Err(ConfigError::ZeroPreviewWidth);
        }
        if !(self.export_encode_quality > 0.0 && self.export_encode_quality <= 1.0) {
            return Err(ConfigError::InvalidQuality(self.export_encode_quality));
        }
        if self.max_canvas_pixels == 0 {
            return Err(ConfigError::ZeroCanvasLimit);
        }

        self.brightness_range.validate("brightness")?;
        self.contrast_range.validate("contrast")?;
        self.saturation_range.validate("saturation")?;

        // Keep the shifted contrast strictly inside (-255, 259) so the factor
        // stays finite and non-negative.
        let lo = self.contrast_range.min - CONTRAST_NEUTRAL;
        let hi = self.contrast_range.max - CONTRAST_NEUTRAL;
        if lo <= -255.0 || hi >= CONTRAST_POLE {
            return Err(ConfigError::DegenerateContrast {
                min: self.contrast_range.min,
                max: self.contrast_range.max,
            });
        }

        Ok(())
    }

    /// JPEG quality on the 1-100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.export_encode_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.max_preview_width, 800);
        assert_eq!(config.export_encode_quality, 0.92);
        assert_eq!(config.brightness_range, SliderRange::new(50.0, 150.0));
        assert_eq!(config.contrast_range, SliderRange::new(50.0, 150.0));
        assert_eq!(config.saturation_range, SliderRange::new(0.0, 200.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(EngineConfig::default().jpeg_quality(), 92);
        assert_eq!(
            EngineConfig::default()
                .with_export_encode_quality(1.0)
                .jpeg_quality(),
            100
        );
        assert_eq!(
            EngineConfig::default()
                .with_export_encode_quality(0.001)
                .jpeg_quality(),
            1
        );
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = EngineConfig::default().with_brightness_range(SliderRange::new(150.0, 50.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { name: "brightness", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan_range() {
        let config = EngineConfig::default().with_saturation_range(SliderRange::new(f32::NAN, 1.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_contrast_pole() {
        let config = EngineConfig::default().with_contrast_range(SliderRange::new(50.0, 359.0));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DegenerateContrast { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        for q in [0.0, -0.5, 1.5, f32::NAN] {
            let config = EngineConfig::default().with_export_encode_quality(q);
            assert!(config.validate().is_err(), "quality {} should be rejected", q);
        }
    }

    #[test]
    fn test_validate_rejects_zero_preview_width() {
        let config = EngineConfig::default().with_max_preview_width(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroPreviewWidth));
    }

    #[test]
    fn test_slider_range_clamp() {
        let range = SliderRange::new(50.0, 150.0);
        assert_eq!(range.clamp(10.0), 50.0);
        assert_eq!(range.clamp(200.0), 150.0);
        assert_eq!(range.clamp(120.0), 120.0);
        assert!(range.contains(50.0));
        assert!(!range.contains(151.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"maxPreviewWidth":640}"#).unwrap();
        assert_eq!(config.max_preview_width, 640);
        assert_eq!(config.export_encode_quality, 0.92);
        assert!(config.apply_exif_orientation);
    }
}
