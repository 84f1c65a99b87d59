//! Error types for the statistics pipeline.
//!
//! Every failure is scoped to one document: [`PipelineError`] always carries
//! the identifier of the document it belongs to, so a batch run can report it
//! and move on to the next document.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed source used when a write failure does not originate from `std::io`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Per-document failure surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The document source could not be read.
    #[error("input unavailable for `{id}`: {source}")]
    InputUnavailable {
        id: String,
        #[source]
        source: LoadError,
    },

    /// The annotator errored or is not available.
    #[error("annotation failed for `{id}`: {source}")]
    AnnotationFailure {
        id: String,
        #[source]
        source: AnnotationError,
    },

    /// The destination rejected a write. Remaining artifacts of the document
    /// are abandoned.
    #[error("could not write `{}` for `{id}`: {source}", path.display())]
    OutputWriteFailure {
        id: String,
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl PipelineError {
    /// Identifier of the document the error belongs to.
    pub fn document_id(&self) -> &str {
        match self {
            PipelineError::InputUnavailable { id, .. }
            | PipelineError::AnnotationFailure { id, .. }
            | PipelineError::OutputWriteFailure { id, .. } => id,
        }
    }

    /// Short, stable name of the error kind (used in the batch summary).
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InputUnavailable { .. } => "input_unavailable",
            PipelineError::AnnotationFailure { .. } => "annotation_failure",
            PipelineError::OutputWriteFailure { .. } => "output_write_failure",
        }
    }
}

/// Failure to turn a source file into text.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("file is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("unsupported file format `.{0}`")]
    Unsupported(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("{0}")]
    Office(String),
}

/// Failure reported by an [`Annotator`](crate::Annotator).
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotator is unavailable: {0}")]
    Unavailable(String),

    #[error("could not start annotator `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("annotator exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("annotator produced malformed output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Failure while rendering a chart image.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot")]
    Empty,

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
