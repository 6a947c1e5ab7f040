//! Job submission and polling handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use vigie_models::{AnalysisReport, JobView};
use vigie_pipeline::VideoSubmission;

use crate::error::{ApiError, ApiResult};
use crate::security::{
    sanitize_string, validate_media_id, validate_video_url, MAX_CHANNEL_LENGTH, MAX_TITLE_LENGTH,
};
use crate::state::AppState;

/// Request to submit a video to the pipeline.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitJobRequest {
    /// Platform media identifier
    #[validate(length(min = 1, max = 64))]
    pub video_id: String,
    /// Resolved source URL
    #[validate(length(min = 1, max = 2048))]
    pub source_url: String,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub channel: String,
}

/// Response to a submission.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_handle: String,
    pub status: String,
}

/// Submit a video for full-pipeline processing.
///
/// Returns immediately with the job handle; progress and result are
/// polled separately.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let media_id = validate_media_id(&request.video_id).map_err(ApiError::bad_request)?;
    let source_url = validate_video_url(&request.source_url).map_err(ApiError::bad_request)?;

    let submission = VideoSubmission {
        media_id,
        source_url,
        title: sanitize_string(&request.title, MAX_TITLE_LENGTH),
        channel: sanitize_string(&request.channel, MAX_CHANNEL_LENGTH),
    };

    let job_handle = state.orchestrator.submit(submission).await;
    info!(job_handle = %job_handle, "Accepted submission");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_handle,
            status: "started".to_string(),
        }),
    ))
}

/// Poll the progress of a job.
pub async fn get_job_progress(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Json<JobView>> {
    let view = state.orchestrator.progress(&handle).await?;
    Ok(Json(view))
}

/// Fetch the terminal report of a completed job.
///
/// Not found before completion and after the retention purge.
pub async fn get_job_result(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<Json<AnalysisReport>> {
    let report = state.orchestrator.result(&handle).await?;
    Ok(Json(report))
}

/// Cancel response body.
#[derive(Debug, Serialize)]
pub struct CancelJobResponse {
    pub status: String,
}

/// Abandon a job and reclaim its scratch resources early.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> ApiResult<(StatusCode, Json<CancelJobResponse>)> {
    state.orchestrator.cancel(&handle).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(CancelJobResponse {
            status: "cancelling".to_string(),
        }),
    ))
}
