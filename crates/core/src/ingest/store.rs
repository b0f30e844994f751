//! In-memory ingest job store.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::types::{IngestJob, JobState};

/// Error type for job store operations.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    /// No job with the given id.
    #[error("ingest job not found: {0}")]
    NotFound(String),

    /// The state machine forbids the requested transition.
    #[error("invalid state transition for job {id}: {from} -> {to}")]
    InvalidTransition { id: String, from: String, to: String },
}

/// Tracks ingest jobs and enforces their state machine.
///
/// A single write lock covers the read-check-write of each transition, so
/// two racing callers can never both win the same edge.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, IngestJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new job in the `Requested` state.
    pub async fn create(&self) -> IngestJob {
        let now = Utc::now();
        let job = IngestJob {
            id: Uuid::new_v4().to_string(),
            state: JobState::Requested,
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().await.insert(job.id.clone(), job.clone());
        job
    }

    /// Get a job by id.
    pub async fn get(&self, id: &str) -> Result<IngestJob, JobError> {
        self.jobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    /// Move a job to `next`, enforcing the state machine.
    ///
    /// Returns the updated job. An illegal edge leaves the stored job
    /// untouched.
    pub async fn transition(&self, id: &str, next: JobState) -> Result<IngestJob, JobError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| JobError::NotFound(id.to_string()))?;

        if !job.state.can_transition_to(&next) {
            return Err(JobError::InvalidTransition {
                id: id.to_string(),
                from: job.state.status_label().to_string(),
                to: next.status_label().to_string(),
            });
        }

        job.state = next;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    /// Number of jobs currently tracked.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_starts_requested() {
        let store = JobStore::new();
        let job = store.create().await;
        assert_eq!(job.state, JobState::Requested);

        let fetched = store.get(&job.id).await.unwrap();
        assert_eq!(fetched, job);
    }

    #[tokio::test]
    async fn test_get_unknown_job() {
        let store = JobStore::new();
        let err = store.get("no-such-job").await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_full_lifecycle_to_completed() {
        let store = JobStore::new();
        let job = store.create().await;

        let job = store.transition(&job.id, JobState::InProgress).await.unwrap();
        assert_eq!(job.state, JobState::InProgress);

        let job = store.transition(&job.id, JobState::Completed).await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert!(job.updated_at >= job.created_at);
    }

    #[tokio::test]
    async fn test_failed_retains_reason() {
        let store = JobStore::new();
        let job = store.create().await;
        store.transition(&job.id, JobState::InProgress).await.unwrap();
        store
            .transition(
                &job.id,
                JobState::Failed {
                    reason: "backend unreachable".to_string(),
                },
            )
            .await
            .unwrap();

        let fetched = store.get(&job.id).await.unwrap();
        assert_eq!(
            fetched.state,
            JobState::Failed {
                reason: "backend unreachable".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_illegal_transition_leaves_state_untouched() {
        let store = JobStore::new();
        let job = store.create().await;

        let err = store
            .transition(&job.id, JobState::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidTransition { .. }));

        let fetched = store.get(&job.id).await.unwrap();
        assert_eq!(fetched.state, JobState::Requested);
    }

    #[tokio::test]
    async fn test_terminal_state_is_final() {
        let store = JobStore::new();
        let job = store.create().await;
        store.transition(&job.id, JobState::InProgress).await.unwrap();
        store.transition(&job.id, JobState::Completed).await.unwrap();

        let err = store
            .transition(
                &job.id,
                JobState::Failed {
                    reason: "late".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_racing_transitions_have_one_winner() {
        let store = Arc::new(JobStore::new());
        let job = store.create().await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let id = job.id.clone();
            handles.push(tokio::spawn(async move {
                store.transition(&id, JobState::InProgress).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        let fetched = store.get(&job.id).await.unwrap();
        assert_eq!(fetched.state, JobState::InProgress);
    }
}
