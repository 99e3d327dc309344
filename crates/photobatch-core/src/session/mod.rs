//! Batch editing session.
//!
//! An [`EditSession`] owns every decoded source in a batch, one
//! [`ImageEditState`] per input file, and moves through
//!
//! ```text
//! Empty ──open──▶ Loaded ──begin_editing──▶ Editing ──export──▶ Exporting ──▶ Closed
//!                    │                         │
//!                    └─────────export──────────┘
//!
//! any state ──cancel──▶ Closed
//! ```
//!
//! Entering `Closed` drops every source and preview buffer immediately.

mod state;

pub use state::{CloseReason, ImageEditState, SessionState};

use std::sync::Weak;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EngineConfig, SliderRange};
use crate::decode::{decode_source, DecodeError, SourceFile, SourceImage};
use crate::export::{CancelToken, ExportBatch, ExportError, ExportPipeline, ExportProgress};
use crate::preview::{PreviewBuffer, PreviewRenderer};
use crate::transform::TransformError;
use crate::{EditParameters, ParameterError, ParameterField};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not valid in the session's current state.
    #[error("Cannot {operation} while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// `open` was called with no files.
    #[error("Cannot open a session with no files")]
    EmptyBatch,

    /// A file failed to decode; nothing was loaded.
    #[error("Failed to decode image {index} ({file_name}): {source}")]
    Decode {
        index: usize,
        file_name: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A batch of images edited together.
#[derive(Debug)]
pub struct EditSession {
    config: EngineConfig,
    renderer: PreviewRenderer,
    images: Vec<ImageEditState>,
    current: usize,
    state: SessionState,
    close_reason: Option<CloseReason>,
    cancel: CancelToken,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::empty(EngineConfig::default())
    }
}

impl EditSession {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// `SessionError::Config` if `config` does not validate.
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: EngineConfig) -> Self {
        Self {
            renderer: PreviewRenderer::from_config(&config),
            config,
            images: Vec::new(),
            current: 0,
            state: SessionState::Empty,
            close_reason: None,
            cancel: CancelToken::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    /// Number of images currently held. Zero once closed.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// A token that cancels this session's export from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Observe the lifetime of a loaded source without keeping it alive.
    pub fn source_handle(&self, index: usize) -> Option<Weak<SourceImage>> {
        self.images.get(index).map(ImageEditState::source_handle)
    }

    /// Decode every file and load the batch.
    ///
    /// Decoding runs in parallel. If any file fails, nothing is kept and
    /// the session stays `Empty`.
    pub fn open(&mut self, files: &[SourceFile]) -> Result<(), SessionError> {
        self.require(&[SessionState::Empty], "open")?;
        if files.is_empty() {
            return Err(SessionError::EmptyBatch);
        }

        let _span = tracing::info_span!("open", images = files.len()).entered();

        let config = &self.config;
        let images = files
            .par_iter()
            .enumerate()
            .map(|(index, file)| {
                decode_source(file, config)
                    .map(ImageEditState::new)
                    .map_err(|source| SessionError::Decode {
                        index,
                        file_name: file.file_name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(images = images.len(), "session opened");

        self.images = images;
        self.current = 0;
        self.state = SessionState::Loaded;
        Ok(())
    }

    /// Enter `Editing` and render the current image's preview.
    ///
    /// The session is `Editing` even if that first render fails, so the
    /// caller can still navigate away from an image that cannot be drawn.
    pub fn begin_editing(&mut self) -> Result<&PreviewBuffer, SessionError> {
        self.require(&[SessionState::Loaded], "begin editing")?;
        self.state = SessionState::Editing;
        self.current_preview()
    }

    /// Move the cursor by `delta`, wrapping around the batch.
    pub fn navigate(&mut self, delta: isize) -> Result<usize, SessionError> {
        self.require(&[SessionState::Editing], "navigate")?;
        let len = self.images.len() as i128;
        self.current = (self.current as i128 + delta as i128).rem_euclid(len) as usize;
        Ok(self.current)
    }

    /// Set one parameter of image `index`.
    ///
    /// Slider values outside the configured range are clamped. Rotation is
    /// rounded to whole degrees. Returns the parameters as stored.
    pub fn set_parameter(
        &mut self,
        index: usize,
        field: ParameterField,
        value: f64,
    ) -> Result<EditParameters, SessionError> {
        self.require(&[SessionState::Editing], "set a parameter")?;
        if !value.is_finite() {
            return Err(ParameterError::NotFinite {
                field: field.as_str(),
                value,
            }
            .into());
        }

        let slider = |range: SliderRange| {
            let clamped = f64::from(range.clamp(value as f32));
            if !range.contains(value as f32) {
                debug!(field = field.as_str(), value, clamped, "slider value clamped");
            }
            clamped
        };

        let stored = match field {
            ParameterField::Rotation => value,
            ParameterField::Brightness => slider(self.config.brightness_range),
            ParameterField::Contrast => slider(self.config.contrast_range),
            ParameterField::Saturation => slider(self.config.saturation_range),
        };

        Ok(self.image_mut(index)?.update(|p| p.set(field, stored)))
    }

    /// Add `delta_degrees` to image `index`'s rotation.
    pub fn rotate(&mut self, index: usize, delta_degrees: i32) -> Result<EditParameters, SessionError> {
        self.require(&[SessionState::Editing], "rotate")?;
        Ok(self.image_mut(index)?.update(|p| p.rotate_by(delta_degrees)))
    }

    /// Restore image `index` to the default parameters.
    pub fn reset(&mut self, index: usize) -> Result<(), SessionError> {
        self.require(&[SessionState::Editing], "reset")?;
        self.image_mut(index)?.reset();
        Ok(())
    }

    pub fn parameters(&self, index: usize) -> Result<EditParameters, SessionError> {
        self.images
            .get(index)
            .map(|image| *image.params())
            .ok_or_else(|| self.out_of_bounds(index))
    }

    /// Preview of image `index` for its current parameters.
    pub fn preview(&mut self, index: usize) -> Result<&PreviewBuffer, SessionError> {
        self.require(&[SessionState::Loaded, SessionState::Editing], "preview")?;
        let renderer = self.renderer;
        Ok(self.image_mut(index)?.preview(&renderer)?)
    }

    pub fn current_preview(&mut self) -> Result<&PreviewBuffer, SessionError> {
        self.preview(self.current)
    }

    /// Export every image at full resolution and close the session.
    pub fn export(&mut self) -> Result<ExportBatch, SessionError> {
        self.export_with_progress(|_| {})
    }

    /// [`export`](Self::export) with a per-image progress observer.
    ///
    /// Only an `Editing` session exports. The session is `Closed` afterwards
    /// whatever the outcome. Per-image failures are returned inside the
    /// batch; a cancelled export returns
    /// `SessionError::Export(ExportError::Cancelled)` and no outputs. A token
    /// cancelled before the call closes the session without encoding.
    pub fn export_with_progress<F>(&mut self, on_progress: F) -> Result<ExportBatch, SessionError>
    where
        F: Fn(ExportProgress) + Sync,
    {
        self.require(&[SessionState::Editing], "export")?;
        if self.cancel.is_cancelled() {
            self.close(CloseReason::Cancelled);
            return Err(ExportError::Cancelled.into());
        }
        self.state = SessionState::Exporting;

        let pipeline = ExportPipeline::from_config(&self.config);
        let items: Vec<_> = self.images.iter().map(ImageEditState::export_item).collect();
        let result = pipeline.run(&items, &self.cancel, on_progress);
        drop(items);

        let reason = match &result {
            Ok(batch) if batch.is_complete() => CloseReason::Exported,
            Ok(_) => CloseReason::ExportFailed,
            Err(ExportError::Cancelled) => CloseReason::Cancelled,
            Err(ExportError::Incomplete { .. }) => CloseReason::ExportFailed,
        };
        self.close(reason);

        Ok(result?)
    }

    /// Close the session without exporting. Safe to call in any state.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if self.state != SessionState::Closed {
            self.close(CloseReason::Cancelled);
        }
    }

    fn close(&mut self, reason: CloseReason) {
        self.images = Vec::new();
        self.current = 0;
        self.state = SessionState::Closed;
        self.close_reason = Some(reason);

        match reason {
            CloseReason::Exported => info!("session closed after export"),
            CloseReason::ExportFailed => warn!("session closed after a failed export"),
            CloseReason::Cancelled => info!("session cancelled"),
        }
    }

    fn require(&self, allowed: &[SessionState], operation: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn image_mut(&mut self, index: usize) -> Result<&mut ImageEditState, SessionError> {
        let len = self.images.len();
        self.images
            .get_mut(index)
            .ok_or(SessionError::Parameter(ParameterError::IndexOutOfBounds { index, len }))
    }

    fn out_of_bounds(&self, index: usize) -> SessionError {
        ParameterError::IndexOutOfBounds {
            index,
            len: self.images.len(),
        }
        .into()
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            self.cancel.cancel();
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
