//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding rendered rasters as JPEG (with quality), PNG, WebP or BMP
//! - Packaging the result with the original file name and MIME type
//!
//! # Examples
//!
//! ```ignore
//! use photobatch_core::encode::encode_raster;
//!
//! let jpeg_bytes = encode_raster(&raster, "image/jpeg", 92).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod codec;

pub use codec::{encode_raster, EncodeError, OutputFormat};

/// One exported file, ready for the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}
