//! Retention-window cleanup.
//!
//! Scratch artifacts and the job entry stay around after a terminal
//! state so slow consumers can still fetch the result; a scheduled task
//! purges both once the retention window elapses. Cancelled jobs skip
//! the delay, reclaiming their resources immediately.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use vigie_media::remove_artifacts;

use crate::store::JobStore;

/// Schedule the purge of a terminal job.
///
/// Artifact removal tolerates files that no longer exist (already
/// cleaned, moved, or never created), and the store purge is idempotent,
/// so running this twice is harmless. The returned handle lets the
/// caller abort a pending purge.
pub fn schedule_cleanup(
    store: Arc<dyn JobStore>,
    handle: String,
    artifacts: Vec<PathBuf>,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        remove_artifacts(&artifacts).await;
        let existed = store.remove(&handle).await;
        debug!(
            job_handle = %handle,
            artifacts = artifacts.len(),
            existed = existed,
            "Purged terminal job"
        );
    })
}
