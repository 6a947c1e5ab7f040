//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Scratch directory for per-job media artifacts
    pub scratch_dir: PathBuf,
    /// How long terminal job state and artifacts stay queryable
    pub retention: Duration,
    /// Spoken-language hint handed to the transcriber (ISO 639-1)
    pub language: String,
    /// Download stage timeout
    pub download_timeout: Duration,
    /// Audio extraction stage timeout
    pub extract_timeout: Duration,
    /// Transcription stage timeout
    pub transcribe_timeout: Duration,
    /// Analysis stage timeout
    pub analyze_timeout: Duration,
    /// Minimum interval between store writes from download progress
    pub progress_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scratch_dir: PathBuf::from("/tmp/vigie"),
            retention: Duration::from_secs(3600), // 1 hour
            language: "fr".to_string(),
            download_timeout: Duration::from_secs(600),
            extract_timeout: Duration::from_secs(300),
            transcribe_timeout: Duration::from_secs(600),
            analyze_timeout: Duration::from_secs(300),
            progress_interval: Duration::from_millis(250),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        fn secs(name: &str, default: u64) -> Duration {
            Duration::from_secs(
                std::env::var(name)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default),
            )
        }

        Self {
            scratch_dir: std::env::var("VIGIE_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/vigie")),
            retention: secs("VIGIE_RETENTION_SECS", 3600),
            language: std::env::var("VIGIE_LANGUAGE").unwrap_or_else(|_| "fr".to_string()),
            download_timeout: secs("VIGIE_DOWNLOAD_TIMEOUT_SECS", 600),
            extract_timeout: secs("VIGIE_EXTRACT_TIMEOUT_SECS", 300),
            transcribe_timeout: secs("VIGIE_TRANSCRIBE_TIMEOUT_SECS", 600),
            analyze_timeout: secs("VIGIE_ANALYZE_TIMEOUT_SECS", 300),
            progress_interval: Duration::from_millis(250),
        }
    }
}
