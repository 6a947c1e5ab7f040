//! Pipeline error taxonomy.
//!
//! Every stage failure is terminal for its job: no automatic retry, no
//! partial result. The message carries the adapter-level diagnostic
//! verbatim, and nothing else, because it ends up in the user-visible
//! error field.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Audio extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job cancelled by caller")]
    Cancelled,
}

impl PipelineError {
    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }

    pub fn extraction_failed(msg: impl Into<String>) -> Self {
        Self::ExtractionFailed(msg.into())
    }

    pub fn transcription_failed(msg: impl Into<String>) -> Self {
        Self::TranscriptionFailed(msg.into())
    }

    pub fn analysis_failed(msg: impl Into<String>) -> Self {
        Self::AnalysisFailed(msg.into())
    }

    pub fn not_found(handle: impl Into<String>) -> Self {
        Self::NotFound(handle.into())
    }

    /// Check if this is the cancellation marker.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
