//! Analyzer contract.

use async_trait::async_trait;

use vigie_models::AnalysisReport;

use crate::error::AnalyzerResult;

/// Input to an analysis, selecting the strategy.
#[derive(Debug, Clone)]
pub enum AnalysisSource {
    /// Analyze transcript text (full pipeline path)
    Transcript(String),
    /// Analyze the remote video directly (multimodal shortcut)
    RemoteVideo(String),
}

/// Contextual metadata passed alongside the content.
#[derive(Debug, Clone)]
pub struct VideoMeta {
    pub title: String,
    pub channel: String,
}

impl VideoMeta {
    pub fn new(title: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            channel: channel.into(),
        }
    }
}

/// Produces a schema-complete `AnalysisReport` from either source kind.
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        source: &AnalysisSource,
        meta: &VideoMeta,
    ) -> AnalyzerResult<AnalysisReport>;
}
