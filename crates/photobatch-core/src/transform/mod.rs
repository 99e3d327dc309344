//! Transform engine: geometric pass followed by the photometric pass.
//!
//! # Transform Order
//!
//! Every render, preview or export, runs the same two passes:
//! 1. Geometry: allocate the canvas reported by [`resolve`], then draw the
//!    source rotated about the canvas centre and scaled by the render scale.
//! 2. Photometry: brightness, contrast, saturation per pixel
//!    (see [`crate::adjustments`]).
//!
//! The passes are not reorderable; the photometric pass sees the transparent
//! corners produced by rotation but leaves their alpha untouched.

mod geometry;
mod rotation;

pub use geometry::resolve;
pub(crate) use geometry::ceil_dimension;
pub use rotation::composite;

use std::borrow::Cow;

use thiserror::Error;

use crate::adjustments::apply_photometric;
use crate::config::{EngineConfig, DEFAULT_MAX_CANVAS_PIXELS};
use crate::decode::{resize_to_scale, RasterBuffer, SourceImage};
use crate::EditParameters;

/// Errors that can occur while rendering a transform.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// The drawing surface could not be allocated.
    #[error("Canvas unavailable: {width}x{height} exceeds the drawing surface limit")]
    CanvasUnavailable { width: u32, height: u32 },

    /// Render scale must be finite and in (0, 1].
    #[error("Invalid render scale: {0}")]
    InvalidScale(f64),
}

/// Renders [`SourceImage`]s under a canvas size ceiling.
#[derive(Debug, Clone, Copy)]
pub struct TransformEngine {
    max_canvas_pixels: u64,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self {
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }
}

impl TransformEngine {
    pub fn new(max_canvas_pixels: u64) -> Self {
        Self { max_canvas_pixels }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_canvas_pixels)
    }

    /// Render `source` with `params` at `scale` (1.0 for export).
    ///
    /// # Errors
    ///
    /// `TransformError::InvalidScale` for a scale outside (0, 1];
    /// `TransformError::CanvasUnavailable` if the canvas would exceed the
    /// configured pixel ceiling or the address space.
    pub fn apply(
        &self,
        source: &SourceImage,
        params: &EditParameters,
        scale: f64,
    ) -> Result<RasterBuffer, TransformError> {
        if !scale.is_finite() || scale <= 0.0 || scale > 1.0 {
            return Err(TransformError::InvalidScale(scale));
        }

        let rotation = params.normalized_rotation() as f64;
        let canvas = resolve(source.width(), source.height(), rotation, scale);
        self.acquire_canvas(canvas)?;

        let drawn: Cow<'_, RasterBuffer> = if scale < 1.0 {
            Cow::Owned(resize_to_scale(source.raster(), scale))
        } else {
            Cow::Borrowed(source.raster())
        };

        let mut output = composite(&drawn, rotation, canvas);
        apply_photometric(&mut output.pixels, params);
        Ok(output)
    }

    /// Check that a canvas of this size can be allocated.
    fn acquire_canvas(&self, (width, height): (u32, u32)) -> Result<(), TransformError> {
        let pixels = width as u64 * height as u64;
        let fits_address_space = usize::try_from(pixels)
            .ok()
            .and_then(|p| p.checked_mul(RasterBuffer::CHANNELS))
            .is_some();

        if width == 0 || height == 0 || pixels > self.max_canvas_pixels || !fits_address_space {
            return Err(TransformError::CanvasUnavailable { width, height });
        }
        Ok(())
    }
}

/// Render with the default canvas ceiling.
pub fn apply(
    source: &SourceImage,
    params: &EditParameters,
    scale: f64,
) -> Result<RasterBuffer, TransformError> {
    TransformEngine::default().apply(source, params, scale)
}
