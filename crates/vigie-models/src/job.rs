//! Job state for progress tracking and polling.
//!
//! A `Job` is one end-to-end request to process a single media item through
//! the pipeline. It is mutated only by the orchestrator task that owns it
//! (single writer); pollers always receive a clone from the store.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::report::{AnalysisReport, ReportSummary};

/// Percent checkpoint reached when the download stage completes.
pub const DOWNLOAD_COMPLETE_PERCENT: u8 = 40;
/// Percent checkpoint reached when audio extraction completes.
pub const EXTRACT_COMPLETE_PERCENT: u8 = 60;
/// Percent checkpoint reached when transcription completes.
pub const TRANSCRIBE_COMPLETE_PERCENT: u8 = 80;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    /// Job accepted, pipeline not yet running
    #[default]
    Queued,
    /// Fetching the source media
    Downloading,
    /// Converting the media artifact to mono 16 kHz audio
    ExtractingAudio,
    /// Speech-to-text in progress
    Transcribing,
    /// LLM content-risk analysis in progress
    Analyzing,
    /// Terminal: report available
    Completed,
    /// Terminal: error message available
    Failed,
}

impl JobStage {
    /// Get string representation of the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Queued => "queued",
            JobStage::Downloading => "downloading",
            JobStage::ExtractingAudio => "extracting_audio",
            JobStage::Transcribing => "transcribing",
            JobStage::Analyzing => "analyzing",
            JobStage::Completed => "completed",
            JobStage::Failed => "failed",
        }
    }

    /// Check if this is a terminal stage (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Completed | JobStage::Failed)
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tracked pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Opaque handle, unique per submission
    pub handle: String,
    /// Target media identifier (from the search collaborator)
    pub media_id: String,
    /// Resolved source URL handed to the fetcher
    pub source_url: String,
    /// Video title
    pub title: String,
    /// Channel / source label
    pub channel: String,
    /// Current stage
    pub stage: JobStage,
    /// Progress percentage (0-100, monotonically non-decreasing)
    pub percent: u8,
    /// Human-readable status line
    pub status_text: String,
    /// Error message if the job failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Full report, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    /// Derived short form of the report, for cheap polling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReportSummary>,
    /// When the job was submitted
    pub created_at: DateTime<Utc>,
    /// When the job state last changed
    pub updated_at: DateTime<Utc>,
    /// When the job reached a terminal stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new queued job.
    pub fn new(
        handle: impl Into<String>,
        media_id: impl Into<String>,
        source_url: impl Into<String>,
        title: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            handle: handle.into(),
            media_id: media_id.into(),
            source_url: source_url.into(),
            title: title.into(),
            channel: channel.into(),
            stage: JobStage::Queued,
            percent: 0,
            status_text: "Queued".to_string(),
            error_message: None,
            report: None,
            summary: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Check if the job is in a terminal stage.
    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Advance to a new stage at a checkpoint percentage.
    ///
    /// Percent is clamped so it never decreases and never reaches 100
    /// outside of `complete`.
    pub fn advance(&mut self, stage: JobStage, percent: u8, status: impl Into<String>) {
        self.stage = stage;
        self.percent = self.percent.max(percent.min(99));
        self.status_text = status.into();
        self.updated_at = Utc::now();
    }

    /// Fold a download fraction (0.0-1.0) into the 0-40% sub-range.
    pub fn set_download_percent(&mut self, fraction: f32) {
        let scaled = (fraction.clamp(0.0, 1.0) * f32::from(DOWNLOAD_COMPLETE_PERCENT)) as u8;
        self.percent = self.percent.max(scaled.min(DOWNLOAD_COMPLETE_PERCENT));
        self.updated_at = Utc::now();
    }

    /// Mark the job as completed with its report.
    ///
    /// This is the only place percent reaches 100, in the same mutation
    /// that makes the stage terminal.
    pub fn complete(&mut self, report: AnalysisReport) {
        self.summary = Some(ReportSummary::from(&report));
        self.report = Some(report);
        self.stage = JobStage::Completed;
        self.percent = 100;
        self.status_text = "Analysis complete".to_string();
        let now = Utc::now();
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// Mark the job as failed with a diagnostic message.
    pub fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.stage = JobStage::Failed;
        self.status_text = "Failed".to_string();
        self.error_message = Some(error);
        let now = Utc::now();
        self.updated_at = now;
        self.completed_at = Some(now);
    }
}

/// Polling view of a job, returned by the progress endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobView {
    pub stage: JobStage,
    pub percent: u8,
    pub status_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ReportSummary>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            stage: job.stage,
            percent: job.percent,
            status_text: job.status_text.clone(),
            error: job.error_message.clone(),
            summary: job.summary.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_report;

    #[test]
    fn test_job_creation() {
        let job = Job::new("download_abc123_1", "abc123", "https://example/v/abc123", "T", "C");
        assert_eq!(job.stage, JobStage::Queued);
        assert_eq!(job.percent, 0);
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_stage_transitions_hit_checkpoints() {
        let mut job = Job::new("h", "m", "u", "t", "c");

        job.advance(JobStage::Downloading, 0, "Downloading video");
        assert_eq!(job.percent, 0);

        job.advance(JobStage::ExtractingAudio, DOWNLOAD_COMPLETE_PERCENT, "Extracting audio");
        assert_eq!(job.percent, 40);

        job.advance(JobStage::Transcribing, EXTRACT_COMPLETE_PERCENT, "Transcribing");
        assert_eq!(job.percent, 60);

        job.advance(JobStage::Analyzing, TRANSCRIBE_COMPLETE_PERCENT, "Analyzing");
        assert_eq!(job.percent, 80);

        job.complete(test_report());
        assert_eq!(job.stage, JobStage::Completed);
        assert_eq!(job.percent, 100);
        assert!(job.report.is_some());
        assert!(job.summary.is_some());
        assert!(job.is_terminal());
    }

    #[test]
    fn test_percent_is_monotonic() {
        let mut job = Job::new("h", "m", "u", "t", "c");
        job.set_download_percent(0.5);
        assert_eq!(job.percent, 20);

        // A late or repeated progress event must never move percent backwards
        job.set_download_percent(0.2);
        assert_eq!(job.percent, 20);

        job.advance(JobStage::ExtractingAudio, DOWNLOAD_COMPLETE_PERCENT, "Extracting audio");
        job.set_download_percent(0.1);
        assert_eq!(job.percent, 40);
    }

    #[test]
    fn test_advance_never_reports_100() {
        let mut job = Job::new("h", "m", "u", "t", "c");
        job.advance(JobStage::Analyzing, 100, "Analyzing");
        assert_eq!(job.percent, 99);
        assert!(!job.is_terminal());
    }

    #[test]
    fn test_download_fraction_caps_at_40() {
        let mut job = Job::new("h", "m", "u", "t", "c");
        job.set_download_percent(1.5);
        assert_eq!(job.percent, 40);
    }

    #[test]
    fn test_failure_preserves_diagnostic() {
        let mut job = Job::new("h", "m", "u", "t", "c");
        job.advance(JobStage::Downloading, 0, "Downloading video");
        job.fail("yt-dlp failed: HTTP Error 403");

        assert_eq!(job.stage, JobStage::Failed);
        assert_eq!(job.error_message.as_deref(), Some("yt-dlp failed: HTTP Error 403"));
        assert!(job.report.is_none());
        assert!(job.completed_at.is_some());
    }

    #[test]
    fn test_view_carries_summary_only_after_completion() {
        let mut job = Job::new("h", "m", "u", "t", "c");
        let view = JobView::from(&job);
        assert!(view.summary.is_none());

        job.complete(test_report());
        let view = JobView::from(&job);
        assert_eq!(view.percent, 100);
        assert!(view.summary.is_some());
    }
}
