//! Full-resolution export of a batch.
//!
//! Every image is re-rendered from its decoded source at scale 1.0 (never
//! from a preview) and encoded back to its original MIME type. Images are
//! processed in parallel, one rayon task per image; the batch is finished
//! only when the parallel collect has joined every task, so completion is
//! reported exactly once and never before the last image is done.
//!
//! Cancellation is cooperative through [`CancelToken`]. A cancelled export
//! discards every output, including ones that had already been encoded.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::decode::SourceImage;
use crate::encode::{encode_raster, EncodeError, EncodedFile};
use crate::transform::{TransformEngine, TransformError};
use crate::EditParameters;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whole-batch export failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    /// The export was cancelled; no outputs are returned.
    #[error("Export cancelled")]
    Cancelled,

    /// Some images failed, so the batch cannot be handed over as complete.
    #[error("Export incomplete: {failed} of {total} images failed")]
    Incomplete { failed: usize, total: usize },
}

/// Why a single image could not be exported.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportFailure {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A failed image, identified by batch position and file name.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Failed to export image {index} ({file_name}): {source}")]
pub struct ImageExportError {
    pub index: usize,
    pub file_name: String,
    pub mime_type: String,
    #[source]
    pub source: ExportFailure,
}

/// Progress notification, emitted once per finished image.
///
/// Events come from worker threads and may arrive out of index order. They
/// are informational only; the batch result is the completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    pub index: usize,
    pub completed: usize,
    pub total: usize,
    pub succeeded: bool,
}

/// One image to export.
#[derive(Debug, Clone, Copy)]
pub struct ExportItem<'a> {
    pub source: &'a SourceImage,
    pub params: EditParameters,
}

/// Per-image outcomes of a finished export, in batch order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBatch {
    results: Vec<Result<EncodedFile, ImageExportError>>,
}

impl ExportBatch {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True when every image exported successfully.
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(Result::is_ok)
    }

    pub fn results(&self) -> &[Result<EncodedFile, ImageExportError>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Result<EncodedFile, ImageExportError>> {
        self.results
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &EncodedFile> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImageExportError> {
        self.results.iter().filter_map(|r| r.as_ref().err())
    }

    /// All files, or `ExportError::Incomplete` if any image failed.
    pub fn into_files(self) -> Result<Vec<EncodedFile>, ExportError> {
        let total = self.results.len();
        let failed = self.results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            return Err(ExportError::Incomplete { failed, total });
        }
        Ok(self.results.into_iter().filter_map(Result::ok).collect())
    }
}

/// Renders and encodes batches at full resolution.
#[derive(Debug, Clone, Copy)]
pub struct ExportPipeline {
    engine: TransformEngine,
    quality: u8,
}

impl ExportPipeline {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            engine: TransformEngine::from_config(config),
            quality: config.jpeg_quality(),
        }
    }

    /// Export every item, reporting progress as images finish.
    ///
    /// # Errors
    ///
    /// `ExportError::Cancelled` if `cancel` is set at any point before the
    /// join completes. Per-image failures do not abort the batch; they are
    /// returned in the [`ExportBatch`].
    pub fn run<F>(
        &self,
        items: &[ExportItem<'_>],
        cancel: &CancelToken,
        on_progress: F,
    ) -> Result<ExportBatch, ExportError>
    where
        F: Fn(ExportProgress) + Sync,
    {
        let total = items.len();
        let _span = tracing::info_span!("export_all", images = total).entered();

        let completed = AtomicUsize::new(0);

        let outcomes: Vec<Option<Result<EncodedFile, ImageExportError>>> = items
            .par_iter()
            .enumerate()
            .map(|(index, item)| {
                let outcome = self.export_one(index, item, cancel)?;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                on_progress(ExportProgress {
                    index,
                    completed: done,
                    total,
                    succeeded: outcome.is_ok(),
                });
                Some(outcome)
            })
            .collect();

        // Everything has joined. A cancellation observed here or by any task
        // discards the whole batch.
        if cancel.is_cancelled() || outcomes.iter().any(Option::is_none) {
            warn!(images = total, "export cancelled, discarding outputs");
            return Err(ExportError::Cancelled);
        }

        let results: Vec<_> = outcomes.into_iter().flatten().collect();
        let batch = ExportBatch { results };

        for failure in batch.failures() {
            warn!(index = failure.index, file_name = %failure.file_name, error = %failure.source, "image export failed");
        }
        info!(
            images = total,
            failed = batch.failures().count(),
            "export finished"
        );

        Ok(batch)
    }

    /// `None` means the task saw the cancel flag and produced nothing.
    fn export_one(
        &self,
        index: usize,
        item: &ExportItem<'_>,
        cancel: &CancelToken,
    ) -> Option<Result<EncodedFile, ImageExportError>> {
        if cancel.is_cancelled() {
            return None;
        }

        let fail = |source: ExportFailure| ImageExportError {
            index,
            file_name: item.source.file_name().to_string(),
            mime_type: item.source.mime_type().to_string(),
            source,
        };

        let raster = match self.engine.apply(item.source, &item.params, 1.0) {
            Ok(raster) => raster,
            Err(e) => return Some(Err(fail(e.into()))),
        };

        if cancel.is_cancelled() {
            return None;
        }

        let result = encode_raster(&raster, item.source.mime_type(), self.quality)
            .map(|bytes| EncodedFile {
                bytes,
                file_name: item.source.file_name().to_string(),
                mime_type: item.source.mime_type().to_string(),
            })
            .map_err(|e| fail(e.into()));

        Some(result)
    }
}

/// Export `items` with `config`, without progress reporting.
pub fn export_all(
    items: &[ExportItem<'_>],
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<ExportBatch, ExportError> {
    ExportPipeline::from_config(config).run(items, cancel, |_| {})
}


// ============================================================================
// Property-Based Tests
// ============================================================================
