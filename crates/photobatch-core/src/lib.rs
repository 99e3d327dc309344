//! Photobatch Core - batch photo editing engine
//!
//! This crate provides the image transformation engine used to prepare a batch
//! of photos before upload: decoding, rotation with a non-clipping canvas,
//! brightness/contrast/saturation adjustments, bounded-size previews, and
//! full-resolution export back to each file's original format.
//!
//! # Pipeline
//!
//! ```text
//! bytes ──decode──▶ SourceImage ──transform(params, scale)──▶ RasterBuffer
//!                                   │                           │
//!                           scale < 1 (preview)          scale = 1 (export)
//!                                                               │
//!                                                          encode ──▶ EncodedFile
//! ```
//!
//! The [`session::EditSession`] owns the whole batch and drives the lifecycle.

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod encode;
pub mod export;
pub mod luminance;
pub mod preview;
pub mod session;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, EngineConfig, SliderRange};
pub use decode::{decode_source, DecodeError, RasterBuffer, SourceFile, SourceImage};
pub use encode::{EncodeError, EncodedFile};
pub use export::{
    export_all, CancelToken, ExportBatch, ExportError, ExportItem, ExportPipeline, ExportProgress,
    ImageExportError,
};
pub use preview::{PreviewBuffer, PreviewRenderer};
pub use session::{CloseReason, EditSession, ImageEditState, SessionError, SessionState};
pub use transform::{apply, resolve, TransformError};

use thiserror::Error;

/// The four values governing one image's transform.
///
/// `rotation_degrees` is stored as accumulated by the rotate buttons and is
/// only normalized when geometry is computed. The three sliders are
/// percentages where 100 is the advertised "no adjustment" position.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditParameters {
    /// Rotation in degrees, positive = clockwise on screen
    pub rotation_degrees: i32,
    /// Brightness percentage (documented range 50 to 150)
    pub brightness: f32,
    /// Contrast slider position (documented range 50 to 150)
    pub contrast: f32,
    /// Saturation percentage (documented range 0 to 200)
    pub saturation: f32,
}

impl Default for EditParameters {
    fn default() -> Self {
        Self {
            rotation_degrees: 0,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
        }
    }
}

impl EditParameters {
    /// Create a new EditParameters at the default baseline
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> i32 {
        self.rotation_degrees.rem_euclid(360)
    }

    /// Accumulate a rotation step. The stored value is not wrapped.
    pub fn rotate_by(&mut self, delta_degrees: i32) {
        self.rotation_degrees = self.rotation_degrees.saturating_add(delta_degrees);
    }

    /// Write a single field. Rotation is rounded to whole degrees.
    pub fn set(&mut self, field: ParameterField, value: f64) {
        match field {
            ParameterField::Rotation => {
                self.rotation_degrees = value.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
            }
            ParameterField::Brightness => self.brightness = value as f32,
            ParameterField::Contrast => self.contrast = value as f32,
            ParameterField::Saturation => self.saturation = value as f32,
        }
    }

    /// Read a single field as `f64`.
    pub fn get(&self, field: ParameterField) -> f64 {
        match field {
            ParameterField::Rotation => self.rotation_degrees as f64,
            ParameterField::Brightness => self.brightness as f64,
            ParameterField::Contrast => self.contrast as f64,
            ParameterField::Saturation => self.saturation as f64,
        }
    }
}

/// Identifies one of the four edit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterField {
    Rotation,
    Brightness,
    Contrast,
    Saturation,
}

impl ParameterField {
    /// All fields, in display order.
    pub const ALL: [ParameterField; 4] = [
        ParameterField::Rotation,
        ParameterField::Brightness,
        ParameterField::Contrast,
        ParameterField::Saturation,
    ];

    /// Stable lowercase name used by the JS bindings and in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterField::Rotation => "rotation",
            ParameterField::Brightness => "brightness",
            ParameterField::Contrast => "contrast",
            ParameterField::Saturation => "saturation",
        }
    }
}

impl std::str::FromStr for ParameterField {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotation" | "rotationDegrees" => Ok(ParameterField::Rotation),
            "brightness" => Ok(ParameterField::Brightness),
            "contrast" => Ok(ParameterField::Contrast),
            "saturation" => Ok(ParameterField::Saturation),
            other => Err(ParameterError::UnknownField(other.to_string())),
        }
    }
}

/// Errors raised when a parameter update is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    /// NaN or infinite slider value.
    #[error("Value for {field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    /// The image index does not exist in this session.
    #[error("Image index {index} is out of bounds for a batch of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Field name not recognised.
    #[error("Unknown parameter field: {0}")]
    UnknownField(String),
}
