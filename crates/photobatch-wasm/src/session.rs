//! Edit session bindings.
//!
//! `JsEditSession` wraps the core [`EditSession`] for the admin panel. Files
//! come in from the picker as `{ bytes: Uint8Array, fileName, mimeType }`
//! objects; exported files go out as
//! `{ ok, fileName, mimeType, bytes }` or `{ ok: false, fileName, mimeType, error }`
//! records for the upload step.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsEditSession({ maxPreviewWidth: 640 });
//! session.open(await Promise.all(files.map(async (f) => ({
//!   bytes: new Uint8Array(await f.arrayBuffer()),
//!   fileName: f.name,
//!   mimeType: f.type,
//! }))));
//! const preview = session.beginEditing();
//! session.rotate(0, 90);
//! const results = session.export();
//! ```

use std::fmt::Display;

use photobatch_core::{EditSession, EngineConfig, ParameterField, SessionError, SourceFile};
use wasm_bindgen::prelude::*;

use crate::types::{JsEditParameters, JsRasterBuffer};

fn to_js(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One entry of an export result, before conversion to a JS object.
#[derive(Debug, Clone, PartialEq)]
struct ExportRecord {
    file_name: String,
    mime_type: String,
    outcome: Result<Vec<u8>, String>,
}

/// A batch editing session for JavaScript.
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session. `config` may be `undefined` or a partial
    /// `EngineConfig` object; missing options take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditSession, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js)?
        };
        Self::with_config(config).map_err(to_js)
    }

    /// Current lifecycle state: "empty", "loaded", "editing", "exporting" or "closed"
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.inner.state().to_string()
    }

    /// Number of images in the batch
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(getter, js_name = currentIndex)]
    pub fn current_index(&self) -> usize {
        self.inner.current_index()
    }

    /// Decode and load every file. Fails as a whole if any file is not an image.
    pub fn open(&mut self, files: js_sys::Array) -> Result<(), JsValue> {
        let files = files
            .iter()
            .map(|value| source_file_from_js(&value))
            .collect::<Result<Vec<_>, _>>()?;
        self.inner.open(&files).map_err(to_js)
    }

    /// Start editing; returns the first image's preview.
    #[wasm_bindgen(js_name = beginEditing)]
    pub fn begin_editing(&mut self) -> Result<JsRasterBuffer, JsValue> {
        self.inner
            .begin_editing()
            .map(|preview| JsRasterBuffer::from(preview.raster()))
            .map_err(to_js)
    }

    /// Move the cursor, wrapping around. Returns the new index.
    pub fn navigate(&mut self, delta: i32) -> Result<usize, JsValue> {
        self.inner.navigate(delta as isize).map_err(to_js)
    }

    /// Set "rotation", "brightness", "contrast" or "saturation" on one image.
    #[wasm_bindgen(js_name = setParameter)]
    pub fn set_parameter(
        &mut self,
        index: usize,
        field: &str,
        value: f64,
    ) -> Result<JsEditParameters, JsValue> {
        let field: ParameterField = field.parse().map_err(to_js)?;
        self.inner
            .set_parameter(index, field, value)
            .map(JsEditParameters::from)
            .map_err(to_js)
    }

    /// Rotate one image by `delta` degrees (the UI sends ±90).
    pub fn rotate(&mut self, index: usize, delta: i32) -> Result<JsEditParameters, JsValue> {
        self.inner
            .rotate(index, delta)
            .map(JsEditParameters::from)
            .map_err(to_js)
    }

    pub fn reset(&mut self, index: usize) -> Result<(), JsValue> {
        self.inner.reset(index).map_err(to_js)
    }

    pub fn parameters(&self, index: usize) -> Result<JsEditParameters, JsValue> {
        self.inner
            .parameters(index)
            .map(JsEditParameters::from)
            .map_err(to_js)
    }

    /// Preview of one image with its current parameters.
    pub fn preview(&mut self, index: usize) -> Result<JsRasterBuffer, JsValue> {
        self.inner
            .preview(index)
            .map(|preview| JsRasterBuffer::from(preview.raster()))
            .map_err(to_js)
    }

    /// Export the batch at full resolution and close the session.
    ///
    /// Returns one record per image, in batch order. Failed images are also
    /// reported on the browser console.
    pub fn export(&mut self) -> Result<js_sys::Array, JsValue> {
        let records = self.export_records().map_err(to_js)?;
        let out = js_sys::Array::new();
        for record in &records {
            if let Err(message) = &record.outcome {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "photobatch: export of {} failed: {}",
                    record.file_name, message
                )));
            }
            out.push(&record_to_js(record)?);
        }
        Ok(out)
    }

    /// Close the session without exporting.
    pub fn cancel(&mut self) {
        self.inner.cancel();
    }
}

impl JsEditSession {
    pub(crate) fn with_config(config: EngineConfig) -> Result<Self, SessionError> {
        Ok(Self {
            inner: EditSession::new(config)?,
        })
    }

    fn export_records(&mut self) -> Result<Vec<ExportRecord>, SessionError> {
        let batch = self.inner.export()?;
        Ok(batch
            .into_results()
            .into_iter()
            .map(|result| match result {
                Ok(file) => ExportRecord {
                    file_name: file.file_name,
                    mime_type: file.mime_type,
                    outcome: Ok(file.bytes),
                },
                Err(e) => ExportRecord {
                    outcome: Err(e.source.to_string()),
                    file_name: e.file_name,
                    mime_type: e.mime_type,
                },
            })
            .collect())
    }
}

fn source_file_from_js(value: &JsValue) -> Result<SourceFile, JsValue> {
    let get = |key: &str| js_sys::Reflect::get(value, &JsValue::from_str(key));

    let bytes = get("bytes")?;
    if !bytes.is_instance_of::<js_sys::Uint8Array>() {
        return Err(JsValue::from_str("Source file `bytes` must be a Uint8Array"));
    }
    let bytes = js_sys::Uint8Array::new(&bytes).to_vec();

    let file_name = get("fileName")?
        .as_string()
        .ok_or_else(|| JsValue::from_str("Source file `fileName` must be a string"))?;
    let mime_type = get("mimeType")?.as_string().unwrap_or_default();

    Ok(SourceFile::new(bytes, file_name, mime_type))
}

fn record_to_js(record: &ExportRecord) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    let set = |key: &str, value: &JsValue| {
        js_sys::Reflect::set(&obj, &JsValue::from_str(key), value).map(|_| ())
    };

    set("ok", &JsValue::from_bool(record.outcome.is_ok()))?;
    set("fileName", &JsValue::from_str(&record.file_name))?;
    set("mimeType", &JsValue::from_str(&record.mime_type))?;
    match &record.outcome {
        Ok(bytes) => set("bytes", &js_sys::Uint8Array::from(bytes.as_slice()).into())?,
        Err(message) => set("error", &JsValue::from_str(message))?,
    }

    Ok(obj.into())
}
