//! Application state.

use std::sync::Arc;

use vigie_analyzer::GeminiAnalyzer;
use vigie_media::{FfmpegExtractor, YtDlpFetcher};
use vigie_pipeline::{JobStore, MemoryJobStore, PipelineConfig, PipelineOrchestrator};
use vigie_speech::WhisperClient;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: Arc<PipelineOrchestrator>,
}

impl AppState {
    /// Create state over an existing orchestrator (tests).
    pub fn new(config: ApiConfig, orchestrator: Arc<PipelineOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Create new application state wired to the real adapters.
    pub fn from_env(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pipeline_config = PipelineConfig::from_env();

        let store = Arc::new(MemoryJobStore::new()) as Arc<dyn JobStore>;
        let fetcher = Arc::new(YtDlpFetcher::new(&pipeline_config.scratch_dir));
        let extractor = Arc::new(FfmpegExtractor::new());
        let transcriber = Arc::new(WhisperClient::from_env()?);
        let analyzer = Arc::new(GeminiAnalyzer::from_env()?);

        let orchestrator = Arc::new(PipelineOrchestrator::new(
            store,
            fetcher,
            extractor,
            transcriber,
            analyzer,
            pipeline_config,
        ));

        Ok(Self {
            config,
            orchestrator,
        })
    }
}
