//! Audio extraction from media artifacts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Name of the audio artifact inside a job's scratch directory.
const AUDIO_NAME: &str = "audio.wav";

/// Produces a normalized audio artifact from a media artifact.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Transcode `media_path` into a mono 16 kHz audio file next to it.
    async fn extract(&self, media_path: &Path) -> MediaResult<PathBuf>;
}

/// `AudioExtractor` backed by the FFmpeg CLI.
///
/// Output is mono 16 kHz signed 16-bit PCM, the input format the
/// transcription service expects.
#[derive(Debug, Clone, Default)]
pub struct FfmpegExtractor;

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioExtractor for FfmpegExtractor {
    async fn extract(&self, media_path: &Path) -> MediaResult<PathBuf> {
        if !media_path.exists() {
            return Err(MediaError::FileNotFound(media_path.to_path_buf()));
        }

        let audio_path = media_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(AUDIO_NAME);

        let cmd = FfmpegCommand::new(media_path, &audio_path)
            .input_arg("-nostdin")
            .no_video()
            .audio_channels(1)
            .sample_rate(16000)
            .audio_codec("pcm_s16le");

        FfmpegRunner::new().run(&cmd).await?;

        if !audio_path.exists() {
            return Err(MediaError::ffmpeg_failed(
                "FFmpeg produced no audio output",
                None,
                None,
            ));
        }

        info!(
            input = %media_path.display(),
            output = %audio_path.display(),
            "Extracted audio track"
        );

        Ok(audio_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_input_is_rejected_before_spawning() {
        let extractor = FfmpegExtractor::new();
        let err = extractor
            .extract(Path::new("/nonexistent/video.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
