//! WASM-compatible wrapper types for rasters and edit parameters.

use photobatch_core::decode::RasterBuffer;
use photobatch_core::EditParameters;
use wasm_bindgen::prelude::*;

/// A rendered RGBA raster for JavaScript.
///
/// # Memory Management
///
/// The pixel data lives in WASM memory. `pixels()` copies it into a
/// `Uint8Array`, ready for `new ImageData(...)`. Call `free()` to release
/// a large preview before the finalizer gets to it.
#[wasm_bindgen]
pub struct JsRasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsRasterBuffer {
    /// Get the raster width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the raster height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl From<&RasterBuffer> for JsRasterBuffer {
    fn from(raster: &RasterBuffer) -> Self {
        Self {
            width: raster.width,
            height: raster.height,
            pixels: raster.pixels.clone(),
        }
    }
}

/// Read-only view of one image's edit parameters.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsEditParameters {
    inner: EditParameters,
}

#[wasm_bindgen]
impl JsEditParameters {
    #[wasm_bindgen(getter, js_name = rotationDegrees)]
    pub fn rotation_degrees(&self) -> i32 {
        self.inner.rotation_degrees
    }

    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f32 {
        self.inner.brightness
    }

    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f32 {
        self.inner.contrast
    }

    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f32 {
        self.inner.saturation
    }

    /// Check if all values are at the default baseline
    pub fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    /// Serialize to a plain JS object
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl From<EditParameters> for JsEditParameters {
    fn from(inner: EditParameters) -> Self {
        Self { inner }
    }
}
