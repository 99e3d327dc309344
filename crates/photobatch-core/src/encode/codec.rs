//! Encoding rendered rasters back to the source's format.
//!
//! JPEG uses the configured quality. PNG and WebP are written losslessly,
//! BMP uncompressed. Formats without alpha (JPEG, BMP) are flattened onto
//! black, which is what a transparent canvas corner turns into.

use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::decode::RasterBuffer;

/// Errors that can occur during encoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    /// No encoder exists for the requested MIME type.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The codec reported a failure
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output container chosen from a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
    Bmp,
}

impl OutputFormat {
    /// Map a MIME type to an encoder. Parameters such as `; charset=` are ignored.
    pub fn from_mime(mime_type: &str) -> Result<Self, EncodeError> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(OutputFormat::Jpeg),
            "image/png" => Ok(OutputFormat::Png),
            "image/webp" => Ok(OutputFormat::WebP),
            "image/bmp" | "image/x-ms-bmp" => Ok(OutputFormat::Bmp),
            _ => Err(EncodeError::UnsupportedFormat(mime_type.to_string())),
        }
    }

    /// Whether the quality setting affects this format.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

/// Encode an RGBA raster as `mime_type`.
///
/// # Arguments
///
/// * `raster` - RGBA raster to encode
/// * `mime_type` - Target MIME type, normally the source's
/// * `quality` - JPEG quality (1-100); ignored by lossless formats
pub fn encode_raster(
    raster: &RasterBuffer,
    mime_type: &str,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let format = OutputFormat::from_mime(mime_type)?;
    let (width, height) = raster.dimensions();

    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * RasterBuffer::CHANNELS;
    if raster.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: raster.pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());

    let result = match format {
        OutputFormat::Jpeg => {
            let rgb = flatten_onto_black(&raster.pixels);
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Bmp => {
            let rgb = flatten_onto_black(&raster.pixels);
            BmpEncoder::new(&mut buffer).write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        }
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(
            &raster.pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        OutputFormat::WebP => WebPEncoder::new_lossless(&mut buffer).write_image(
            &raster.pixels,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };

    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

/// Drop alpha by compositing over black.
fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u32;
        for &c in &px[..3] {
            rgb.push(((c as u32 * a + 127) / 255) as u8);
        }
    }
    rgb
}


// ============================================================================
// Property-Based Tests
// ============================================================================
