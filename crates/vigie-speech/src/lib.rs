//! Speech-to-text client.
//!
//! Wraps an OpenAI-compatible transcription endpoint behind the
//! `Transcriber` trait so the pipeline can be tested without the service.

pub mod client;
pub mod error;

pub use client::{Transcriber, WhisperClient};
pub use error::{SpeechError, SpeechResult};
