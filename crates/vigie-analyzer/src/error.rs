//! Analyzer error types.

use thiserror::Error;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Analysis request failed: {0}")]
    RequestFailed(String),

    #[error("Unparseable model response: {0}")]
    UnparseableResponse(String),
}

impl AnalyzerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn unparseable(msg: impl Into<String>) -> Self {
        Self::UnparseableResponse(msg.into())
    }
}
