//! Raster loading for the editing session.
//!
//! This module provides functionality for:
//! - Decoding JPEG, PNG, WebP and BMP sources into RGBA buffers
//! - Correcting EXIF orientation so sources are upright
//! - Downscaling rasters for preview rendering
//!
//! All operations are synchronous. Decoded sources are immutable; the
//! session owns them and drops them when it closes.

mod loader;
mod resize;
mod types;

pub use loader::decode_source;
pub use resize::{resize_to_scale, scaled_dimensions};
pub use types::{DecodeError, Orientation, RasterBuffer, SourceFile, SourceImage};
