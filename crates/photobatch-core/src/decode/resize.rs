//! Downscaling for preview rendering.
//!
//! Uses the `image` crate's Triangle (bilinear) filter. The source is never
//! modified; a new [`RasterBuffer`] is returned.

use super::RasterBuffer;
use crate::transform::ceil_dimension;

/// Scale a raster by `scale`. Edges round up exactly as the canvas does.
///
/// A scale of 1.0 or above returns a copy of the input; this helper never
/// upsamples.
pub fn resize_to_scale(raster: &RasterBuffer, scale: f64) -> RasterBuffer {
    if scale >= 1.0 || raster.is_empty() {
        return raster.clone();
    }

    let (width, height) = scaled_dimensions(raster.width, raster.height, scale);
    if width == raster.width && height == raster.height {
        return raster.clone();
    }

    match raster.to_rgba_image() {
        Some(rgba) => {
            let resized = image::imageops::resize(
                &rgba,
                width,
                height,
                image::imageops::FilterType::Triangle,
            );
            RasterBuffer::from_rgba_image(resized)
        }
        // Buffer length did not match its dimensions; keep the original.
        None => raster.clone(),
    }
}

/// Edge lengths after scaling, never below one pixel.
///
/// Matches [`resolve`](crate::transform::resolve) at 0°, so a downscaled
/// source fills its canvas with no empty row or column.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    (
        ceil_dimension(width as f64 * scale),
        ceil_dimension(height as f64 * scale),
    )
}
