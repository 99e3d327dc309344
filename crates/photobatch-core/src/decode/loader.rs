//! Source decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::error::ImageError;
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, Orientation, RasterBuffer, SourceFile, SourceImage};
use crate::config::EngineConfig;

/// Decode one input file into an RGBA [`SourceImage`].
///
/// The container is detected from the bytes, not from the declared MIME
/// type. The declared MIME type is kept for export; if it is empty the
/// detected format's MIME type is recorded instead.
///
/// # Errors
///
/// Returns `DecodeError::EmptyInput` for zero-length input,
/// `DecodeError::InvalidFormat` if the bytes are not a recognised image, and
/// `DecodeError::CorruptedFile` if decoding fails part-way.
pub fn decode_source(file: &SourceFile, config: &EngineConfig) -> Result<SourceImage, DecodeError> {
    if file.bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(&file.bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;
    let img = reader.decode().map_err(map_image_error)?;

    let img = if config.apply_exif_orientation && carries_exif(format) {
        apply_orientation(img, extract_orientation(&file.bytes))
    } else {
        img
    };

    let mime_type = if file.mime_type.trim().is_empty() {
        format.to_mime_type().to_string()
    } else {
        file.mime_type.clone()
    };

    let raster = RasterBuffer::from_rgba_image(img.into_rgba8());
    tracing::debug!(
        file_name = %file.file_name,
        width = raster.width,
        height = raster.height,
        %mime_type,
        "decoded source"
    );

    Ok(SourceImage::new(raster, file.file_name.clone(), mime_type))
}

fn map_image_error(err: ImageError) -> DecodeError {
    match err {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        ImageError::Limits(e) => DecodeError::TooLarge(e.to_string()),
        other => DecodeError::CorruptedFile(other.to_string()),
    }
}

/// Containers that may hold an EXIF orientation tag.
fn carries_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::WebP | ImageFormat::Png
    )
}

/// Extract EXIF orientation from container bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
