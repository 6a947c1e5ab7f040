//! LLM content-risk analyzer.
//!
//! Two interchangeable strategies share one output contract
//! (`AnalysisReport`): transcript-based analysis and direct-URL analysis
//! of the video itself by a multimodal model. The strategy is selected
//! explicitly per request through `AnalysisSource`; neither is a fallback
//! of the other.

pub mod analyzer;
pub mod error;
pub mod gemini;
pub mod parse;
pub mod prompt;

pub use analyzer::{AnalysisSource, ContentAnalyzer, VideoMeta};
pub use error::{AnalyzerError, AnalyzerResult};
pub use gemini::GeminiAnalyzer;
pub use parse::parse_report;
