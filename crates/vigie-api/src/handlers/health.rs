//! Health check handlers.

use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub yt_dlp: CheckStatus,
    pub ffmpeg: CheckStatus,
    pub speech: CheckStatus,
    pub analyzer: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
        }
    }
}

fn check_binary(name: &str) -> CheckStatus {
    match which::which(name) {
        Ok(_) => CheckStatus::ok(),
        Err(_) => CheckStatus::error(format!("{} not found in PATH", name)),
    }
}

fn check_env(name: &str) -> CheckStatus {
    if std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false) {
        CheckStatus::ok()
    } else {
        CheckStatus::error(format!("{} not set", name))
    }
}

/// Readiness check endpoint (readiness probe).
///
/// Verifies the external tools are on PATH and the service credentials
/// are configured.
pub async fn ready() -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let checks = ReadinessChecks {
        yt_dlp: check_binary("yt-dlp"),
        ffmpeg: check_binary("ffmpeg"),
        speech: check_env("SPEECH_API_KEY"),
        analyzer: check_env("GEMINI_API_KEY"),
    };

    let all_ok = checks.yt_dlp.status == "ok"
        && checks.ffmpeg.status == "ok"
        && checks.speech.status == "ok"
        && checks.analyzer.status == "ok";

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "degraded" }.to_string(),
        checks,
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
