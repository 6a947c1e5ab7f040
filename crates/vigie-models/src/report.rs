//! Content-risk analysis report.
//!
//! The report is the terminal output of a pipeline run. Every field is
//! required when parsing a model response: a missing field is a parse
//! failure at the analyzer layer, never a tolerated default.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall sentiment of the analyzed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Mixed => "mixed",
        }
    }
}

/// Categorical risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Regional and political context detected in the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegionalContext {
    /// Whether the content is political in nature
    pub political_content: bool,
    /// Tribal or community references, verbatim
    pub tribal_references: Vec<String>,
    /// Economic concerns raised (prices, scarcity, unemployment, ...)
    pub economic_concerns: Vec<String>,
    /// Security threats mentioned or implied
    pub security_threats: Vec<String>,
    /// Named regional references (cities, regions, borders)
    pub regional_references: Vec<String>,
}

/// Per-language presence flags for the analyzed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LinguisticProfile {
    pub has_french: bool,
    pub has_english: bool,
    /// Any local language other than French or English
    pub has_local_languages: bool,
    /// More than one language mixed within the same content
    pub mixed_language: bool,
}

/// Structured risk/sentiment report, produced once per job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Free-text summary of the content
    pub summary: String,
    /// Ordered key points
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub risk_flags: Vec<String>,
    /// Credibility score, 0-100
    pub credibility_score: u8,
    pub misinformation_flags: Vec<String>,
    /// Categorical content type (news, opinion, entertainment, ...)
    pub content_type: String,
    /// Languages detected in the content
    pub detected_languages: Vec<String>,
    pub hate_speech: bool,
    pub violence_incitation: bool,
    pub risk_level: RiskLevel,
    pub regional_context: RegionalContext,
    pub linguistic_profile: LinguisticProfile,
}

impl AnalysisReport {
    /// Check schema-level invariants the model must satisfy.
    pub fn check(&self) -> Result<(), String> {
        if self.credibility_score > 100 {
            return Err(format!(
                "credibility_score {} is out of range 0-100",
                self.credibility_score
            ));
        }
        if self.summary.trim().is_empty() {
            return Err("summary is empty".to_string());
        }
        Ok(())
    }
}

/// Short form of a report, derived once at completion and kept separate
/// from the full report so pollers get it cheaply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportSummary {
    pub content_type: String,
    pub sentiment: Sentiment,
    pub detected_languages: Vec<String>,
    pub hate_speech: bool,
    pub violence_incitation: bool,
    pub risk_level: RiskLevel,
    pub summary: String,
}

impl From<&AnalysisReport> for ReportSummary {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            content_type: report.content_type.clone(),
            sentiment: report.sentiment,
            detected_languages: report.detected_languages.clone(),
            hate_speech: report.hate_speech,
            violence_incitation: report.violence_incitation,
            risk_level: report.risk_level,
            summary: report.summary.clone(),
        }
    }
}

/// Fully populated report for tests.
#[cfg(test)]
pub fn test_report() -> AnalysisReport {
    AnalysisReport {
        summary: "A street interview about fuel prices.".to_string(),
        key_points: vec!["Fuel prices rose".to_string()],
        sentiment: Sentiment::Negative,
        topics: vec!["economy".to_string()],
        risk_flags: vec![],
        credibility_score: 72,
        misinformation_flags: vec![],
        content_type: "street_interview".to_string(),
        detected_languages: vec!["fr".to_string()],
        hate_speech: false,
        violence_incitation: false,
        risk_level: RiskLevel::Low,
        regional_context: RegionalContext {
            political_content: false,
            tribal_references: vec![],
            economic_concerns: vec!["fuel prices".to_string()],
            security_threats: vec![],
            regional_references: vec!["Douala".to_string()],
        },
        linguistic_profile: LinguisticProfile {
            has_french: true,
            has_english: false,
            has_local_languages: false,
            mixed_language: false,
        },
    }
}
