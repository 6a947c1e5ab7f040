//! Keyed job state.
//!
//! Access is single-writer-many-reader per key: only the orchestrator
//! task owning a job handle mutates that entry, pollers only read.
//! `get` hands out a clone, so a purge can never invalidate a value a
//! reader is already holding.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vigie_models::Job;

/// Keyed job state behind a swappable interface.
///
/// The in-memory implementation below is the deployment default; a
/// persistent store only has to satisfy these three operations.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a copy of the job for this handle.
    async fn get(&self, handle: &str) -> Option<Job>;

    /// Insert or replace the job under its handle.
    async fn put(&self, job: Job);

    /// Purge the job. Returns whether an entry existed.
    async fn remove(&self, handle: &str) -> bool;
}

/// In-process job store.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, handle: &str) -> Option<Job> {
        self.jobs.read().await.get(handle).cloned()
    }

    async fn put(&self, job: Job) {
        self.jobs.write().await.insert(job.handle.clone(), job);
    }

    async fn remove(&self, handle: &str) -> bool {
        self.jobs.write().await.remove(handle).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigie_models::JobStage;

    fn job(handle: &str) -> Job {
        Job::new(handle, "abc123", "https://example/video/abc123", "T", "C")
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryJobStore::new();
        store.put(job("h1")).await;

        let fetched = store.get("h1").await.unwrap();
        assert_eq!(fetched.handle, "h1");
        assert_eq!(fetched.stage, JobStage::Queued);
        assert!(store.get("h2").await.is_none());
    }

    #[tokio::test]
    async fn test_get_is_copy_on_read() {
        let store = MemoryJobStore::new();
        store.put(job("h1")).await;

        let mut copy = store.get("h1").await.unwrap();
        copy.fail("local mutation");

        // The store must not observe mutations of a handed-out copy
        let fresh = store.get("h1").await.unwrap();
        assert_eq!(fresh.stage, JobStage::Queued);
        assert!(fresh.error_message.is_none());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = MemoryJobStore::new();
        store.put(job("h1")).await;

        assert!(store.remove("h1").await);
        assert!(!store.remove("h1").await);
        assert!(store.get("h1").await.is_none());
    }

    #[tokio::test]
    async fn test_reader_keeps_value_across_purge() {
        let store = MemoryJobStore::new();
        store.put(job("h1")).await;

        let held = store.get("h1").await.unwrap();
        store.remove("h1").await;

        // A reader that copied before the purge still has its value
        assert_eq!(held.handle, "h1");
        assert!(store.get("h1").await.is_none());
    }
}
