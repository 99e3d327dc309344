use std::fmt;
use std::sync::{Arc, Weak};

use crate::decode::SourceImage;
use crate::export::ExportItem;
use crate::preview::{PreviewBuffer, PreviewRenderer};
use crate::transform::TransformError;
use crate::EditParameters;

/// Lifecycle of an [`EditSession`](super::EditSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
    Editing,
    Exporting,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Empty => "empty",
            SessionState::Loaded => "loaded",
            SessionState::Editing => "editing",
            SessionState::Exporting => "exporting",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// How a session reached `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Every image exported.
    Exported,
    /// The export ran to completion but at least one image failed.
    ExportFailed,
    /// `cancel()` was called, or the export observed a cancelled token.
    Cancelled,
}

/// One image in the batch: its source, its parameters and a cached preview.
#[derive(Debug)]
pub struct ImageEditState {
    source: Arc<SourceImage>,
    params: EditParameters,
    preview: Option<PreviewBuffer>,
}

impl ImageEditState {
    pub fn new(source: SourceImage) -> Self {
        Self {
            source: Arc::new(source),
            params: EditParameters::default(),
            preview: None,
        }
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn params(&self) -> &EditParameters {
        &self.params
    }

    /// Mutate the parameters. The cached preview is dropped.
    pub fn update(&mut self, f: impl FnOnce(&mut EditParameters)) -> EditParameters {
        f(&mut self.params);
        self.preview = None;
        self.params
    }

    /// Back to the default baseline.
    pub fn reset(&mut self) {
        self.update(|params| *params = EditParameters::default());
    }

    /// The cached preview, if it reflects the current parameters.
    pub fn cached_preview(&self) -> Option<&PreviewBuffer> {
        self.preview
            .as_ref()
            .filter(|preview| preview.is_current_for(&self.params))
    }

    /// The preview for the current parameters, rendering on a cache miss.
    pub fn preview(&mut self, renderer: &PreviewRenderer) -> Result<&PreviewBuffer, TransformError> {
        let cached = self
            .preview
            .take()
            .filter(|preview| preview.is_current_for(&self.params));

        let preview = match cached {
            Some(preview) => preview,
            None => renderer.render(&self.source, &self.params)?,
        };

        Ok(self.preview.insert(preview))
    }

    pub(crate) fn export_item(&self) -> ExportItem<'_> {
        ExportItem {
            source: &self.source,
            params: self.params,
        }
    }

    pub(crate) fn source_handle(&self) -> Weak<SourceImage> {
        Arc::downgrade(&self.source)
    }
}
