//! Ingest job and batch types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an ingest job.
///
/// State machine flow:
/// ```text
/// Requested -> InProgress -> Completed
///                   |
///                   v
///                Failed
/// ```
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobState {
    /// Job accepted, waiting for the worker.
    Requested,
    /// The worker is processing the batch.
    InProgress,
    /// All records were persisted.
    Completed,
    /// The batch was abandoned; no partial success.
    Failed { reason: String },
}

impl JobState {
    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed { .. })
    }

    /// Whether the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: &JobState) -> bool {
        match (self, next) {
            (JobState::Requested, JobState::InProgress) => true,
            (JobState::InProgress, JobState::Completed) => true,
            (JobState::InProgress, JobState::Failed { .. }) => true,
            _ => false,
        }
    }

    /// Legacy status vocabulary used on the wire.
    pub fn status_label(&self) -> &'static str {
        match self {
            JobState::Requested => "REQUESTED",
            JobState::InProgress => "IN_PROGRESS",
            JobState::Completed => "COMPLETED",
            JobState::Failed { .. } => "FAILED",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status_label())
    }
}

/// An ingest job tracked by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestJob {
    /// Unique identifier (UUID).
    pub id: String,
    /// Current state.
    pub state: JobState,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// Last state change timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A single record submitted for ingest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngestRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// A batch of records submitted together.
///
/// Type names are optional; records fall back to the configured defaults
/// ("Book" / "Can Circulate" out of the box). The worker resolves names
/// to ids when the job runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IngestBatch {
    pub records: Vec<IngestRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_type_name: Option<String>,
}
