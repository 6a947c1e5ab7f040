//! Direct-URL analysis handler.
//!
//! This path bypasses download/extraction/transcription entirely: the
//! URL goes straight to the multimodal analyzer and the report comes
//! back in the same response. No job handle, no progress reporting.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use vigie_models::AnalysisReport;

use crate::error::{ApiError, ApiResult};
use crate::security::{sanitize_string, validate_video_url, MAX_CHANNEL_LENGTH, MAX_TITLE_LENGTH};
use crate::state::AppState;

/// Request for synchronous direct-URL analysis.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeUrlRequest {
    #[validate(length(min = 1, max = 2048))]
    pub video_url: String,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub channel: String,
}

/// Analyze a remote video directly.
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeUrlRequest>,
) -> ApiResult<Json<AnalysisReport>> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let video_url = validate_video_url(&request.video_url).map_err(ApiError::bad_request)?;
    let title = sanitize_string(&request.title, MAX_TITLE_LENGTH);
    let channel = sanitize_string(&request.channel, MAX_CHANNEL_LENGTH);

    let report = state
        .orchestrator
        .analyze_direct(&video_url, &title, &channel)
        .await?;

    Ok(Json(report))
}
