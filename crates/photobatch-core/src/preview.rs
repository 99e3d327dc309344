//! Bounded-resolution previews.
//!
//! A preview is the full transform rendered at
//! `min(1, max_preview_width / source_width)`. Each buffer remembers the
//! parameters it was rendered with so a cache holder can tell whether it is
//! still current.

use crate::config::EngineConfig;
use crate::decode::{RasterBuffer, SourceImage};
use crate::transform::{TransformEngine, TransformError};
use crate::EditParameters;

/// A rendered preview and the inputs it reflects.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBuffer {
    raster: RasterBuffer,
    params: EditParameters,
    scale: f64,
}

impl PreviewBuffer {
    pub fn raster(&self) -> &RasterBuffer {
        &self.raster
    }

    /// Parameters this preview was rendered with.
    pub fn params(&self) -> &EditParameters {
        &self.params
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.raster.width
    }

    pub fn height(&self) -> u32 {
        self.raster.height
    }

    /// Whether this preview reflects `params`.
    pub fn is_current_for(&self, params: &EditParameters) -> bool {
        self.params == *params
    }
}

/// Renders previews at the configured maximum width.
#[derive(Debug, Clone, Copy)]
pub struct PreviewRenderer {
    max_preview_width: u32,
    engine: TransformEngine,
}

impl Default for PreviewRenderer {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl PreviewRenderer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_preview_width: config.max_preview_width,
            engine: TransformEngine::from_config(config),
        }
    }

    pub fn max_preview_width(&self) -> u32 {
        self.max_preview_width
    }

    /// Scale used for a source of the given width.
    pub fn scale_for(&self, source_width: u32) -> f64 {
        if source_width == 0 {
            return 1.0;
        }
        (self.max_preview_width as f64 / source_width as f64).min(1.0)
    }

    /// Render `source` with `params` at preview scale.
    pub fn render(
        &self,
        source: &SourceImage,
        params: &EditParameters,
    ) -> Result<PreviewBuffer, TransformError> {
        let scale = self.scale_for(source.width());
        let raster = self.engine.apply(source, params, scale)?;

        tracing::debug!(
            file_name = source.file_name(),
            width = raster.width,
            height = raster.height,
            scale,
            "rendered preview"
        );

        Ok(PreviewBuffer {
            raster,
            params: *params,
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::solid_source;

    #[test]
    fn test_small_source_renders_at_full_size() {
        let renderer = PreviewRenderer::default();
        let source = solid_source(300, 200, [1, 2, 3]);
        let preview = renderer.render(&source, &EditParameters::default()).unwrap();
        assert_eq!(preview.scale(), 1.0);
        assert_eq!((preview.width(), preview.height()), (300, 200));
    }

    #[test]
    fn test_wide_source_is_bounded() {
        let renderer = PreviewRenderer::default();
        let source = solid_source(2000, 1000, [1, 2, 3]);
        let preview = renderer.render(&source, &EditParameters::default()).unwrap();
        assert_eq!(preview.scale(), 0.4);
        assert_eq!((preview.width(), preview.height()), (800, 400));
    }

    #[test]
    fn test_downscaled_preview_has_no_empty_edge() {
        let renderer = PreviewRenderer::default();
        let source = solid_source(3000, 2000, [40, 80, 120]);
        for rotation_degrees in [0, 90, 180, 270] {
            let params = EditParameters {
                rotation_degrees,
                ..EditParameters::default()
            };
            let preview = renderer.render(&source, &params).unwrap();
            let raster = preview.raster();
            let transparent = raster
                .pixels
                .chunks_exact(4)
                .filter(|px| px[3] != 255)
                .count();
            assert_eq!(transparent, 0, "rotation {}", rotation_degrees);
            let (w, h) = raster.dimensions();
            assert_eq!(raster.pixel(w - 1, h - 1), [40, 80, 120, 255]);
        }
        let preview = renderer.render(&source, &EditParameters::default()).unwrap();
        assert_eq!((preview.width(), preview.height()), (800, 534));
    }

    #[test]
    fn test_rotated_preview_scale_follows_source_width() {
        let renderer = PreviewRenderer::default();
        let source = solid_source(1600, 400, [1, 2, 3]);
        let params = EditParameters {
            rotation_degrees: 90,
            ..EditParameters::default()
        };
        let preview = renderer.render(&source, &params).unwrap();
        assert_eq!((preview.width(), preview.height()), (200, 800));
    }

    #[test]
    fn test_custom_preview_width() {
        let config = EngineConfig::default().with_max_preview_width(100);
        let renderer = PreviewRenderer::from_config(&config);
        let source = solid_source(400, 400, [1, 2, 3]);
        let preview = renderer.render(&source, &EditParameters::default()).unwrap();
        assert_eq!((preview.width(), preview.height()), (100, 100));
    }

    #[test]
    fn test_preview_records_params() {
        let renderer = PreviewRenderer::default();
        let source = solid_source(10, 10, [100, 100, 100]);
        let params = EditParameters {
            brightness: 120.0,
            ..EditParameters::default()
        };
        let preview = renderer.render(&source, &params).unwrap();
        assert!(preview.is_current_for(&params));
        assert!(!preview.is_current_for(&EditParameters::default()));
        assert_eq!(preview.raster().pixel(5, 5), [120, 120, 120, 255]);
    }

    #[test]
    fn test_canvas_limit_propagates() {
        let config = EngineConfig::default().with_max_canvas_pixels(10);
        let renderer = PreviewRenderer::from_config(&config);
        let source = solid_source(10, 10, [0, 0, 0]);
        let result = renderer.render(&source, &EditParameters::default());
        assert!(matches!(result, Err(TransformError::CanvasUnavailable { .. })));
    }
}
