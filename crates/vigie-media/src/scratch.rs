//! Scratch directory helpers.
//!
//! Every job gets its own directory under the scratch root; artifacts in
//! it are transient and are purged by the pipeline's cleanup task after
//! the retention window.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Path of the scratch directory for one job.
pub fn job_scratch_dir(scratch_root: &Path, artifact_id: &str) -> PathBuf {
    scratch_root.join(artifact_id)
}

/// Remove scratch artifacts, tolerating files that no longer exist.
///
/// Artifacts may already be gone (cleaned by a previous pass, never
/// created because a stage failed early); that is not an error.
pub async fn remove_artifacts(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!(path = %path.display(), "Removed scratch artifact"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove scratch artifact"),
        }
        // Drop the per-job directory once it is empty
        if let Some(parent) = path.parent() {
            let _ = tokio::fs::remove_dir(parent).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_removes_existing_artifacts() {
        let root = TempDir::new().unwrap();
        let dir = job_scratch_dir(root.path(), "download_abc123_1");
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let media = dir.join("source.mp4");
        let audio = dir.join("audio.wav");
        tokio::fs::write(&media, b"m").await.unwrap();
        tokio::fs::write(&audio, b"a").await.unwrap();

        remove_artifacts(&[media.clone(), audio.clone()]).await;

        assert!(!media.exists());
        assert!(!audio.exists());
        assert!(!dir.exists(), "Empty per-job directory should be dropped");
    }

    #[tokio::test]
    async fn test_missing_artifacts_are_tolerated() {
        let root = TempDir::new().unwrap();
        let ghost = root.path().join("gone").join("source.mp4");

        // Must not panic or error on files that were never created
        remove_artifacts(&[ghost.clone(), ghost]).await;
    }
}
