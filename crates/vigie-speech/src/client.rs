//! HTTP client for the transcription service.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{SpeechError, SpeechResult};

/// Default request timeout. Transcription scales with audio length, so
/// this is generous; the pipeline applies its own stage timeout on top.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Converts an audio artifact into plain text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio_path` in the hinted language
    /// (ISO 639-1 code).
    async fn transcribe(&self, audio_path: &Path, language: &str) -> SpeechResult<String>;
}

/// Transcription response body.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// `Transcriber` backed by an OpenAI-compatible transcription endpoint.
pub struct WhisperClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl WhisperClient {
    /// Create a client for the given endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> SpeechResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SpeechError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: "whisper-1".to_string(),
            client,
        })
    }

    /// Create a client from `SPEECH_API_*` environment variables.
    pub fn from_env() -> SpeechResult<Self> {
        let api_key = std::env::var("SPEECH_API_KEY")
            .map_err(|_| SpeechError::config_error("SPEECH_API_KEY not set"))?;
        let base_url = std::env::var("SPEECH_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());

        let mut client = Self::new(base_url, api_key)?;
        if let Ok(model) = std::env::var("SPEECH_MODEL") {
            client.model = model;
        }
        Ok(client)
    }

    /// Override the transcription model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio_path: &Path, language: &str) -> SpeechResult<String> {
        let audio = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());

        debug!(
            path = %audio_path.display(),
            size_kb = audio.len() / 1024,
            language = language,
            "Uploading audio for transcription"
        );

        let part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| SpeechError::transcription_failed(format!("Invalid audio part: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", language.to_string())
            .text("response_format", "json");

        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechError::transcription_failed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::transcription_failed(format!(
                "Transcription service returned {}: {}",
                status, body
            )));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            SpeechError::transcription_failed(format!("Failed to parse response: {}", e))
        })?;

        let text = parsed.text.trim().to_string();
        if text.is_empty() {
            return Err(SpeechError::transcription_failed(
                "Transcription service returned no text",
            ));
        }

        info!(chars = text.len(), "Transcription complete");
        Ok(text)
    }
}
