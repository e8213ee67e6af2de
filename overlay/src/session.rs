//! Source document lifecycle and export jobs.
//!
//! A [`Session`] holds the loaded source document (bytes, display name, page
//! geometry) together with the [`EngineCore`] editing annotations on it.
//!
//! Loading a document either fully succeeds, replacing the previous document
//! and resetting all annotation and selection state, or fails and leaves the
//! session exactly as it was. Export is split in two: [`Session::prepare_export`]
//! snapshots everything the compositor needs, and [`ExportJob::run`] does the
//! heavy work without touching the session, so a failure costs nothing but a
//! retry. Annotations edited after a job was prepared are not part of it.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use crate::engine::{Action, EngineCore};
use crate::export::{Compositor, DocumentGeometry, DrawInstruction, ExportOptions, PageRenderer, project};

/// Boxed error from a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Default prefix for exported filenames.
pub const DEFAULT_OUTPUT_PREFIX: &str = "annotated-";

/// Errors produced by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The source buffer was empty.
    #[error("source document is empty")]
    EmptyInput,

    /// The compositor could not read the source buffer.
    #[error("failed to decode source document: {0}")]
    Decode(#[source] BoxError),

    /// Export was requested with no document loaded.
    #[error("no document loaded")]
    NoDocument,

    /// The compositor failed while writing the output.
    #[error("export failed: {0}")]
    Export(#[source] BoxError),
}

/// A decoded source document.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Arc<[u8]>,
    pub geometry: DocumentGeometry,
}

/// A finished output document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Everything needed to produce one output document.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub filename: String,
    pub source: Arc<[u8]>,
    pub instructions: Vec<DrawInstruction>,
}

impl ExportJob {
    /// Composite the instructions into the source document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Export`] if the compositor fails.
    pub fn run<C: Compositor>(&self, compositor: &C) -> Result<ExportedDocument, SessionError> {
        match compositor.compose(&self.source, &self.instructions) {
            Ok(bytes) => {
                tracing::info!(filename = %self.filename, instructions = self.instructions.len(), "export complete");
                Ok(ExportedDocument { filename: self.filename.clone(), bytes })
            }
            Err(e) => {
                tracing::warn!(error = %e, filename = %self.filename, "export failed");
                Err(SessionError::Export(Box::new(e)))
            }
        }
    }
}

/// One editing session over a single source document.
pub struct Session<C> {
    compositor: C,
    source: Option<SourceDocument>,
    options: ExportOptions,
    output_prefix: String,
    pub engine: EngineCore,
}

impl<C: Compositor> Session<C> {
    #[must_use]
    pub fn new(compositor: C) -> Self {
        Self {
            compositor,
            source: None,
            options: ExportOptions::default(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            engine: EngineCore::new(),
        }
    }

    /// Use these export options for subsequent jobs.
    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Use this prefix for derived output filenames.
    #[must_use]
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// The loaded document, if any.
    #[must_use]
    pub fn source(&self) -> Option<&SourceDocument> {
        self.source.as_ref()
    }

    /// The compositor this session exports through.
    #[must_use]
    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Replace the source document. All annotations and selection state are
    /// discarded on success.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyInput`] for an empty buffer and
    /// [`SessionError::Decode`] when the compositor rejects it. The session is
    /// unchanged in both cases.
    pub fn load_document(&mut self, bytes: Vec<u8>, name: impl Into<String>) -> Result<&SourceDocument, SessionError> {
        let name = name.into();
        if bytes.is_empty() {
            tracing::warn!(%name, "refusing empty source document");
            return Err(SessionError::EmptyInput);
        }
        let geometry = self.compositor.decode(&bytes).map_err(|e| {
            tracing::warn!(error = %e, %name, "source document decode failed");
            SessionError::Decode(Box::new(e))
        })?;
        tracing::info!(%name, pages = geometry.page_count(), "source document loaded");

        self.engine.reset();
        Ok(self.source.insert(SourceDocument { name, bytes: bytes.into(), geometry }))
    }

    /// Render every page at `render_scale` and hand the pixel boxes to the
    /// engine. Pages the renderer cannot produce keep no box, so clicks and
    /// drags on them are ignored until a later render succeeds.
    pub fn render_pages<R: PageRenderer>(&mut self, renderer: &mut R, render_scale: f64) -> Vec<Action> {
        let Some(source) = self.source.as_ref() else {
            return Vec::new();
        };
        let actions = self.engine.set_render_scale(render_scale);
        for (page_index, _) in source.geometry.iter() {
            match renderer.render(page_index, render_scale) {
                Some(page_box) => self.engine.set_page_box(page_index, page_box),
                None => tracing::debug!(page_index, render_scale, "page render cancelled or failed"),
            }
        }
        actions
    }

    /// Draw instructions for the current store, without running an export.
    #[must_use]
    pub fn instructions(&self) -> Vec<DrawInstruction> {
        match self.source.as_ref() {
            Some(source) => project(&self.engine.doc, &source.geometry, self.options),
            None => Vec::new(),
        }
    }

    /// Snapshot the current annotations into an export job.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoDocument`] if nothing is loaded.
    pub fn prepare_export(&self) -> Result<ExportJob, SessionError> {
        let source = self.source.as_ref().ok_or(SessionError::NoDocument)?;
        Ok(ExportJob {
            filename: format!("{}{}", self.output_prefix, source.name),
            source: Arc::clone(&source.bytes),
            instructions: project(&self.engine.doc, &source.geometry, self.options),
        })
    }

    /// Prepare and run an export in one step.
    ///
    /// # Errors
    ///
    /// See [`Session::prepare_export`] and [`ExportJob::run`].
    pub fn export(&self) -> Result<ExportedDocument, SessionError> {
        self.prepare_export()?.run(&self.compositor)
    }
}
