//! Photobatch WASM - WebAssembly bindings for the photobatch editing session
//!
//! This crate exposes the photobatch-core session to the browser admin panel,
//! which supplies files from its picker and uploads the exported results.
//!
//! # Module Structure
//!
//! - `session` - `JsEditSession`, the batch lifecycle (open, edit, export, cancel)
//! - `types` - WASM-compatible wrapper types for rasters and edit parameters
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession } from '@photobatch/wasm';
//!
//! await init();
//!
//! const session = new JsEditSession();
//! session.open(files);
//! const preview = session.beginEditing();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(preview.pixels()), preview.width), 0, 0);
//! ```

use wasm_bindgen::prelude::*;

mod session;
mod types;

pub use session::JsEditSession;
pub use types::{JsEditParameters, JsRasterBuffer};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
