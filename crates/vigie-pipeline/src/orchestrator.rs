//! Pipeline orchestrator.
//!
//! One submission becomes one spawned task running the stage sequence
//! download → extract → transcribe → analyze, committing stage, percent
//! checkpoint and status line to the job store after every transition.
//! Jobs are independent: each owns its store entry, its scratch
//! directory and its cancellation channel, so N jobs can sit inside
//! different blocking calls at once.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use vigie_analyzer::{AnalysisSource, ContentAnalyzer, VideoMeta};
use vigie_media::{AudioExtractor, MediaFetcher};
use vigie_models::job::{
    DOWNLOAD_COMPLETE_PERCENT, EXTRACT_COMPLETE_PERCENT, TRANSCRIBE_COMPLETE_PERCENT,
};
use vigie_models::{AnalysisReport, Job, JobStage, JobView};
use vigie_speech::Transcriber;

use crate::cleanup::schedule_cleanup;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::store::JobStore;

/// One submission to the full pipeline.
#[derive(Debug, Clone)]
pub struct VideoSubmission {
    pub media_id: String,
    pub source_url: String,
    pub title: String,
    pub channel: String,
}

/// Outcome of one guarded stage call.
enum StageOutcome<T, E> {
    Ok(T),
    Err(E),
    TimedOut(Duration),
    Cancelled,
}

/// The pipeline orchestrator.
pub struct PipelineOrchestrator {
    store: Arc<dyn JobStore>,
    fetcher: Arc<dyn MediaFetcher>,
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
    analyzer: Arc<dyn ContentAnalyzer>,
    config: PipelineConfig,
    /// Cancellation senders for in-flight jobs
    cancellations: Mutex<HashMap<String, watch::Sender<bool>>>,
    /// Strictly-increasing millis for handle minting
    handle_clock: AtomicI64,
}

impl PipelineOrchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        fetcher: Arc<dyn MediaFetcher>,
        extractor: Arc<dyn AudioExtractor>,
        transcriber: Arc<dyn Transcriber>,
        analyzer: Arc<dyn ContentAnalyzer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            extractor,
            transcriber,
            analyzer,
            config,
            cancellations: Mutex::new(HashMap::new()),
            handle_clock: AtomicI64::new(0),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Submit a video for full-pipeline processing.
    ///
    /// Returns immediately with the job handle; the pipeline runs as an
    /// independent task and is observed through `progress`/`result`.
    pub async fn submit(self: &Arc<Self>, submission: VideoSubmission) -> String {
        let handle = self.mint_handle(&submission.media_id);

        let job = Job::new(
            &handle,
            &submission.media_id,
            &submission.source_url,
            &submission.title,
            &submission.channel,
        );
        self.store.put(job).await;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancellations
            .lock()
            .await
            .insert(handle.clone(), cancel_tx);

        let orchestrator = Arc::clone(self);
        let job_handle = handle.clone();
        tokio::spawn(async move {
            orchestrator.run_job(submission, job_handle, cancel_rx).await;
        });

        info!(job_handle = %handle, "Job submitted");
        handle
    }

    /// Direct-URL analysis: a single synchronous call, no job handle and
    /// no progress reporting. This is a first-class alternate entry
    /// point, never a fallback of the transcript path.
    pub async fn analyze_direct(
        &self,
        video_url: &str,
        title: &str,
        channel: &str,
    ) -> PipelineResult<AnalysisReport> {
        let meta = VideoMeta::new(title, channel);
        let source = AnalysisSource::RemoteVideo(video_url.to_string());

        match tokio::time::timeout(self.config.analyze_timeout, self.analyzer.analyze(&source, &meta))
            .await
        {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(PipelineError::analysis_failed(e.to_string())),
            Err(_) => Err(PipelineError::analysis_failed(format!(
                "timed out after {}s",
                self.config.analyze_timeout.as_secs()
            ))),
        }
    }

    /// Current polling view of a job.
    pub async fn progress(&self, handle: &str) -> PipelineResult<JobView> {
        self.store
            .get(handle)
            .await
            .map(|job| JobView::from(&job))
            .ok_or_else(|| PipelineError::not_found(handle))
    }

    /// Terminal report of a completed job.
    ///
    /// Not found before completion and after the retention purge.
    pub async fn result(&self, handle: &str) -> PipelineResult<AnalysisReport> {
        let job = self
            .store
            .get(handle)
            .await
            .ok_or_else(|| PipelineError::not_found(handle))?;

        match (job.stage, job.report) {
            (JobStage::Completed, Some(report)) => Ok(report),
            _ => Err(PipelineError::not_found(handle)),
        }
    }

    /// Abandon a job: the running stage is dropped and scratch resources
    /// are reclaimed immediately instead of after the retention window.
    pub async fn cancel(&self, handle: &str) -> PipelineResult<()> {
        if self.store.get(handle).await.is_none() {
            return Err(PipelineError::not_found(handle));
        }

        if let Some(cancel_tx) = self.cancellations.lock().await.get(handle) {
            let _ = cancel_tx.send(true);
            info!(job_handle = %handle, "Cancellation requested");
        }
        Ok(())
    }

    /// Mint a handle unique across submissions, including retries of the
    /// same media item within one millisecond.
    fn mint_handle(&self, media_id: &str) -> String {
        let now = Utc::now().timestamp_millis();
        let millis = self
            .handle_clock
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| {
                Some(now.max(prev + 1))
            })
            .map(|prev| now.max(prev + 1))
            .unwrap_or(now);

        format!("download_{}_{}", sanitize_media_id(media_id), millis)
    }

    async fn run_job(
        self: Arc<Self>,
        submission: VideoSubmission,
        handle: String,
        mut cancel_rx: watch::Receiver<bool>,
    ) {
        let mut artifacts: Vec<PathBuf> = Vec::new();
        let result = self
            .run_stages(&submission, &handle, &mut cancel_rx, &mut artifacts)
            .await;

        let cancelled = matches!(&result, Err(e) if e.is_cancelled());
        match result {
            Ok(report) => {
                self.update_job(&handle, |job| job.complete(report)).await;
                info!(job_handle = %handle, "Job completed");
            }
            Err(e) => {
                self.update_job(&handle, |job| job.fail(e.to_string())).await;
                warn!(job_handle = %handle, error = %e, "Job failed");
            }
        }

        self.cancellations.lock().await.remove(&handle);

        // Artifacts outlive the job by the retention window so delayed
        // consumers can still be served; a cancelled job reclaims them now.
        let delay = if cancelled {
            Duration::ZERO
        } else {
            self.config.retention
        };
        schedule_cleanup(Arc::clone(&self.store), handle, artifacts, delay);
    }

    async fn run_stages(
        &self,
        submission: &VideoSubmission,
        handle: &str,
        cancel_rx: &mut watch::Receiver<bool>,
        artifacts: &mut Vec<PathBuf>,
    ) -> PipelineResult<AnalysisReport> {
        // Stage 1: download. Progress from the tool is folded into the
        // 0-40% sub-range as it streams in.
        self.update_job(handle, |job| {
            job.advance(JobStage::Downloading, 0, "Downloading video")
        })
        .await;

        let (progress_tx, progress_rx) = watch::channel(0.0f32);
        let forwarder = tokio::spawn(forward_download_progress(
            Arc::clone(&self.store),
            handle.to_string(),
            progress_rx,
            self.config.progress_interval,
        ));

        let fetched = run_stage(
            cancel_rx,
            self.config.download_timeout,
            self.fetcher.fetch(&submission.source_url, handle, progress_tx),
        )
        .await;
        // The forwarder exits once the fetch future (and its sender) is
        // gone; join it before the next store write so a stale download
        // percent can never land on top of a later stage.
        let _ = forwarder.await;

        let media_path = resolve(fetched, PipelineError::FetchFailed)?;
        artifacts.push(media_path.clone());

        // Stage 2: audio extraction.
        self.update_job(handle, |job| {
            job.advance(
                JobStage::ExtractingAudio,
                DOWNLOAD_COMPLETE_PERCENT,
                "Download complete, extracting audio track",
            )
        })
        .await;

        let extracted = run_stage(
            cancel_rx,
            self.config.extract_timeout,
            self.extractor.extract(&media_path),
        )
        .await;
        let audio_path = resolve(extracted, PipelineError::ExtractionFailed)?;
        artifacts.push(audio_path.clone());

        // Stage 3: transcription.
        self.update_job(handle, |job| {
            job.advance(
                JobStage::Transcribing,
                EXTRACT_COMPLETE_PERCENT,
                "Audio ready, transcribing speech",
            )
        })
        .await;

        let transcribed = run_stage(
            cancel_rx,
            self.config.transcribe_timeout,
            self.transcriber.transcribe(&audio_path, &self.config.language),
        )
        .await;
        let transcript = resolve(transcribed, PipelineError::TranscriptionFailed)?;

        // Stage 4: analysis.
        self.update_job(handle, |job| {
            job.advance(
                JobStage::Analyzing,
                TRANSCRIBE_COMPLETE_PERCENT,
                "Transcript ready, analyzing content",
            )
        })
        .await;

        let meta = VideoMeta::new(&submission.title, &submission.channel);
        let source = AnalysisSource::Transcript(transcript);
        let analyzed = run_stage(
            cancel_rx,
            self.config.analyze_timeout,
            self.analyzer.analyze(&source, &meta),
        )
        .await;
        resolve(analyzed, PipelineError::AnalysisFailed)
    }

    /// Read-modify-write of the owned job entry.
    ///
    /// Safe without cross-job locking: this task is the entry's only
    /// writer.
    async fn update_job<F>(&self, handle: &str, mutate: F)
    where
        F: FnOnce(&mut Job),
    {
        if let Some(mut job) = self.store.get(handle).await {
            mutate(&mut job);
            self.store.put(job).await;
        }
    }
}

/// Run one stage future under the job's cancellation channel and the
/// stage's timeout. Dropping the future reaps any spawned child process
/// (adapters use `kill_on_drop`).
async fn run_stage<T, E, F>(
    cancel_rx: &mut watch::Receiver<bool>,
    limit: Duration,
    fut: F,
) -> StageOutcome<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    tokio::select! {
        biased;
        _ = cancelled(cancel_rx) => StageOutcome::Cancelled,
        res = tokio::time::timeout(limit, fut) => match res {
            Ok(Ok(value)) => StageOutcome::Ok(value),
            Ok(Err(e)) => StageOutcome::Err(e),
            Err(_) => StageOutcome::TimedOut(limit),
        },
    }
}

/// Resolve a stage outcome into the stage-specific pipeline error.
fn resolve<T, E: std::fmt::Display>(
    outcome: StageOutcome<T, E>,
    wrap: fn(String) -> PipelineError,
) -> PipelineResult<T> {
    match outcome {
        StageOutcome::Ok(value) => Ok(value),
        StageOutcome::Err(e) => Err(wrap(e.to_string())),
        StageOutcome::TimedOut(limit) => Err(wrap(format!("timed out after {}s", limit.as_secs()))),
        StageOutcome::Cancelled => Err(PipelineError::Cancelled),
    }
}

/// Resolve only when cancellation is signalled; pend forever otherwise.
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Consume the download progress channel at a bounded rate, folding the
/// latest fraction into the job's 0-40% sub-range.
async fn forward_download_progress(
    store: Arc<dyn JobStore>,
    handle: String,
    mut progress_rx: watch::Receiver<f32>,
    interval: Duration,
) {
    while progress_rx.changed().await.is_ok() {
        let fraction = *progress_rx.borrow_and_update();
        if let Some(mut job) = store.get(&handle).await {
            job.set_download_percent(fraction);
            store.put(job).await;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Keep handles (and the scratch paths derived from them) filesystem-safe.
fn sanitize_media_id(media_id: &str) -> String {
    media_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
