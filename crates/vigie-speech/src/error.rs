//! Speech client error types.

use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpeechError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn transcription_failed(msg: impl Into<String>) -> Self {
        Self::TranscriptionFailed(msg.into())
    }
}
