//! Media download using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};
use crate::progress::{parse_download_percent, ProgressSender};

/// Name of the media artifact inside a job's scratch directory.
const ARTIFACT_NAME: &str = "source.mp4";

/// Fetches a remote media item into a local scratch artifact.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download `source_url` into the artifact directory for `artifact_id`,
    /// reporting completion fractions (0.0-1.0) on `progress`.
    ///
    /// On success exactly one artifact file exists at the returned path.
    /// On failure no partial file remains that could be mistaken for a
    /// complete artifact.
    async fn fetch(
        &self,
        source_url: &str,
        artifact_id: &str,
        progress: ProgressSender,
    ) -> MediaResult<PathBuf>;
}

/// `MediaFetcher` backed by the yt-dlp CLI.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    scratch_root: PathBuf,
    format: String,
}

impl YtDlpFetcher {
    /// Create a fetcher writing artifacts under `scratch_root`.
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            format: "best[ext=mp4]/best".to_string(),
        }
    }

    /// Override the yt-dlp format selector.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    async fn remove_partial_files(dir: &Path) {
        if let Ok(mut entries) = tokio::fs::read_dir(dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if name.starts_with(ARTIFACT_NAME) {
                    if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                        warn!(path = ?entry.path(), error = %e, "Failed to remove partial download");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        source_url: &str,
        artifact_id: &str,
        progress: ProgressSender,
    ) -> MediaResult<PathBuf> {
        which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;

        let artifact_dir = self.scratch_root.join(artifact_id);
        tokio::fs::create_dir_all(&artifact_dir).await?;
        let output_path = artifact_dir.join(ARTIFACT_NAME);

        info!(
            url = %source_url,
            output = %output_path.display(),
            "Downloading media with yt-dlp"
        );

        let output_path_str = output_path.to_string_lossy();
        let args = vec![
            "--newline",
            "--no-playlist",
            "--no-warnings",
            "-f",
            &self.format,
            "-o",
            &output_path_str,
            source_url,
        ];

        let mut child = Command::new("yt-dlp")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().expect("stdout not captured");
        let stderr = child.stderr.take().expect("stderr not captured");

        // Fold progress lines into the watch channel as they arrive
        let progress_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(fraction) = parse_download_percent(&line) {
                    let _ = progress.send(fraction);
                } else {
                    debug!("yt-dlp: {}", line.trim());
                }
            }
        });

        let stderr_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut collected = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    debug!("yt-dlp stderr: {}", trimmed);
                    collected.push(trimmed);
                }
            }
            collected
        });

        let status = child.wait().await?;
        let _ = progress_handle.await;
        let stderr_lines = stderr_handle.await.unwrap_or_default();

        if !status.success() {
            Self::remove_partial_files(&artifact_dir).await;
            let diagnostic = stderr_lines
                .last()
                .map(String::as_str)
                .unwrap_or("Unknown error");
            return Err(MediaError::download_failed(format!(
                "yt-dlp failed: {}",
                diagnostic
            )));
        }

        // yt-dlp can report success while producing no output; treat that
        // as a hard failure rather than handing back a missing path.
        let artifact_size = match tokio::fs::metadata(&output_path).await {
            Ok(metadata) if metadata.len() > 0 => metadata.len(),
            _ => {
                Self::remove_partial_files(&artifact_dir).await;
                return Err(MediaError::download_failed(
                    "yt-dlp reported success but no artifact was produced",
                ));
            }
        };

        info!(
            output = %output_path.display(),
            size_mb = artifact_size as f64 / (1024.0 * 1024.0),
            "Downloaded media successfully"
        );

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};
    use tempfile::TempDir;
    use tokio::sync::watch;

    // Tests below install a fake yt-dlp on PATH; serialize them since the
    // process environment is shared.
    static PATH_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    #[cfg(unix)]
    fn install_fake_ytdlp(dir: &TempDir, script_body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.path().join("yt-dlp");
        std::fs::write(&script, format!("#!/bin/sh\n{}\n", script_body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let original = std::env::var("PATH").unwrap_or_default();
        std::env::set_var("PATH", format!("{}:{}", dir.path().display(), original));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_zero_without_artifact_is_a_fetch_failure() {
        let _guard = PATH_LOCK.lock().unwrap();
        let bin_dir = TempDir::new().unwrap();
        install_fake_ytdlp(&bin_dir, "exit 0");

        let scratch = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::new(scratch.path());
        let (progress_tx, _progress_rx) = watch::channel(0.0f32);

        let err = fetcher
            .fetch("https://example/video/abc123", "download_abc123_1", progress_tx)
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("no artifact was produced"), "error: {}", msg);
        // Nothing misleading is left behind
        assert!(!scratch.path().join("download_abc123_1/source.mp4").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_download_reports_progress_and_artifact() {
        let _guard = PATH_LOCK.lock().unwrap();
        let bin_dir = TempDir::new().unwrap();
        // $7 is the -o output path in the argument layout the fetcher uses
        install_fake_ytdlp(
            &bin_dir,
            "echo '[download]  50.0% of 1.00MiB'\necho '[download] 100% of 1.00MiB'\nprintf video > \"$7\"",
        );

        let scratch = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::new(scratch.path());
        let (progress_tx, progress_rx) = watch::channel(0.0f32);

        let path = fetcher
            .fetch("https://example/video/abc123", "download_abc123_2", progress_tx)
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "source.mp4");
        // The watch channel holds the last parsed fraction
        assert_eq!(*progress_rx.borrow(), 1.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_download_cleans_partials_and_keeps_diagnostic() {
        let _guard = PATH_LOCK.lock().unwrap();
        let bin_dir = TempDir::new().unwrap();
        install_fake_ytdlp(
            &bin_dir,
            "printf partial > \"$7.part\"\necho 'ERROR: HTTP Error 403: Forbidden' >&2\nexit 1",
        );

        let scratch = TempDir::new().unwrap();
        let fetcher = YtDlpFetcher::new(scratch.path());
        let (progress_tx, _progress_rx) = watch::channel(0.0f32);

        let err = fetcher
            .fetch("https://example/video/abc123", "download_abc123_3", progress_tx)
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("403"), "error: {}", msg);
        assert!(!scratch
            .path()
            .join("download_abc123_3/source.mp4.part")
            .exists());
    }

    #[tokio::test]
    async fn test_remove_partial_files_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let partial = dir.path().join("source.mp4.part");
        tokio::fs::write(&partial, b"partial").await.unwrap();

        YtDlpFetcher::remove_partial_files(dir.path()).await;
        assert!(!partial.exists());

        // Second pass over an already-clean directory must not fail
        YtDlpFetcher::remove_partial_files(dir.path()).await;
    }

    #[tokio::test]
    async fn test_unrelated_files_survive_partial_cleanup() {
        let dir = TempDir::new().unwrap();
        let other = dir.path().join("audio.wav");
        tokio::fs::write(&other, b"audio").await.unwrap();

        YtDlpFetcher::remove_partial_files(dir.path()).await;
        assert!(other.exists());
    }
}
