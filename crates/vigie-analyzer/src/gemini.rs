//! Gemini API client implementing both analysis strategies.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use vigie_models::AnalysisReport;

use crate::analyzer::{AnalysisSource, ContentAnalyzer, VideoMeta};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::parse::parse_report;
use crate::prompt::{transcript_prompt, video_prompt};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
        }
    }

    fn video_uri(uri: impl Into<String>) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                file_uri: uri.into(),
                mime_type: "video/mp4".to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct FileData {
    #[serde(rename = "fileUri")]
    file_uri: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

/// `ContentAnalyzer` backed by the Gemini API.
///
/// The transcript strategy sends the rubric plus transcript text; the
/// direct-URL strategy sends the rubric plus a `fileData` part so the
/// multimodal model watches the video itself.
pub struct GeminiAnalyzer {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiAnalyzer {
    /// Create an analyzer against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> AnalyzerResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create an analyzer against a custom endpoint (tests).
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> AnalyzerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AnalyzerError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            client,
        })
    }

    /// Create an analyzer from `GEMINI_*` environment variables.
    pub fn from_env() -> AnalyzerResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AnalyzerError::config_error("GEMINI_API_KEY not set"))?;
        let mut analyzer = Self::new(api_key)?;
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            analyzer.model = model;
        }
        Ok(analyzer)
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, parts: Vec<Part>) -> AnalyzerResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::request_failed(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::request_failed(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            AnalyzerError::request_failed(format!("Failed to parse Gemini response: {}", e))
        })?;

        gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| AnalyzerError::request_failed("No content in Gemini response"))
    }
}

#[async_trait]
impl ContentAnalyzer for GeminiAnalyzer {
    async fn analyze(
        &self,
        source: &AnalysisSource,
        meta: &VideoMeta,
    ) -> AnalyzerResult<AnalysisReport> {
        let parts = match source {
            AnalysisSource::Transcript(transcript) => {
                debug!(chars = transcript.len(), "Analyzing transcript");
                vec![Part::text(transcript_prompt(transcript, &meta.title, &meta.channel))]
            }
            AnalysisSource::RemoteVideo(url) => {
                debug!(url = %url, "Analyzing remote video");
                vec![
                    Part::text(video_prompt(&meta.title, &meta.channel)),
                    Part::video_uri(url.clone()),
                ]
            }
        };

        let text = self.generate(parts).await?;
        let report = parse_report(&text)?;

        info!(
            risk_level = %report.risk_level,
            content_type = %report.content_type,
            "Analysis complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn report_value() -> serde_json::Value {
        json!({
            "summary": "A political speech about upcoming elections.",
            "key_points": ["calls for registration"],
            "sentiment": "neutral",
            "topics": ["politics"],
            "risk_flags": ["political mobilization"],
            "credibility_score": 70,
            "misinformation_flags": [],
            "content_type": "speech",
            "detected_languages": ["fr", "en"],
            "hate_speech": false,
            "violence_incitation": false,
            "risk_level": "medium",
            "regional_context": {
                "political_content": true,
                "tribal_references": [],
                "economic_concerns": [],
                "security_threats": [],
                "regional_references": ["Bamenda"]
            },
            "linguistic_profile": {
                "has_french": true,
                "has_english": true,
                "has_local_languages": false,
                "mixed_language": true
            }
        })
    }

    fn gemini_reply(text: String) -> serde_json::Value {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    #[tokio::test]
    async fn test_transcript_strategy_returns_full_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("TRANSCRIPT"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(gemini_reply(report_value().to_string())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "k").unwrap();
        let report = analyzer
            .analyze(
                &AnalysisSource::Transcript("Inscrivez-vous pour voter".to_string()),
                &VideoMeta::new("T", "C"),
            )
            .await
            .unwrap();

        assert_eq!(report.risk_level, vigie_models::RiskLevel::Medium);
        assert!(report.regional_context.political_content);
        assert!(report.linguistic_profile.mixed_language);
    }

    #[tokio::test]
    async fn test_url_strategy_attaches_file_data() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_string_contains("fileData"))
            .and(body_string_contains("https://example/video/abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(gemini_reply(report_value().to_string())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "k").unwrap();
        let report = analyzer
            .analyze(
                &AnalysisSource::RemoteVideo("https://example/video/abc123".to_string()),
                &VideoMeta::new("T", "C"),
            )
            .await
            .unwrap();

        assert!(!report.summary.is_empty());
    }

    #[tokio::test]
    async fn test_reply_without_json_is_unparseable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_reply("I cannot assess this video.".to_string())),
            )
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "k").unwrap();
        let err = analyzer
            .analyze(
                &AnalysisSource::Transcript("text".to_string()),
                &VideoMeta::new("T", "C"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::UnparseableResponse(_)));
    }

    #[tokio::test]
    async fn test_api_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let analyzer = GeminiAnalyzer::with_base_url(server.uri(), "k").unwrap();
        let err = analyzer
            .analyze(
                &AnalysisSource::Transcript("text".to_string()),
                &VideoMeta::new("T", "C"),
            )
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("429"), "unexpected error: {}", msg);
    }
}
