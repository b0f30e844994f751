//! Mock reference resolver for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::context::CallContext;
use crate::reference::{ReferenceKind, ReferenceRecord, ReferenceResolver, Resolution};
use crate::storage::StorageError;

/// Mock implementation of the ReferenceResolver trait.
///
/// Provides controllable behavior for testing:
/// - Configure outcomes per `(kind, id)` pair
/// - Track lookups for assertions (call counts prove deduplication)
/// - Simulate failures and slow backends
#[derive(Default)]
pub struct MockResolver {
    /// Configured outcomes by (kind, id). Unconfigured ids answer NotFound.
    records: Arc<RwLock<HashMap<(ReferenceKind, String), Resolution>>>,
    /// Configured records by (kind, name) for find_by_name.
    by_name: Arc<RwLock<HashMap<(ReferenceKind, String), ReferenceRecord>>>,
    /// Recorded resolve calls.
    calls: Arc<RwLock<Vec<(ReferenceKind, String)>>>,
    /// Artificial delay applied to every resolve.
    delay: Arc<RwLock<Option<Duration>>>,
    /// If set, the next find_by_name fails with this error.
    next_find_error: Arc<RwLock<Option<StorageError>>>,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the outcome for a `(kind, id)` pair.
    pub async fn set_record(&self, kind: ReferenceKind, id: &str, outcome: Resolution) {
        self.records
            .write()
            .await
            .insert((kind, id.to_string()), outcome);
    }

    /// Register a record that resolves by id and by name.
    pub async fn add_found(&self, kind: ReferenceKind, id: &str, name: &str) {
        let record = ReferenceRecord {
            id: id.to_string(),
            name: name.to_string(),
        };
        self.set_record(kind, id, Resolution::Found(record.clone()))
            .await;
        self.by_name
            .write()
            .await
            .insert((kind, name.to_string()), record);
    }

    /// Get recorded resolve calls.
    pub async fn recorded_calls(&self) -> Vec<(ReferenceKind, String)> {
        self.calls.read().await.clone()
    }

    /// Number of resolve calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Delay every subsequent resolve by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// Configure the next find_by_name call to fail.
    pub async fn set_next_find_error(&self, error: StorageError) {
        *self.next_find_error.write().await = Some(error);
    }
}

#[async_trait]
impl ReferenceResolver for MockResolver {
    async fn resolve(&self, _ctx: &CallContext, kind: ReferenceKind, id: &str) -> Resolution {
        self.calls.write().await.push((kind, id.to_string()));

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.records
            .read()
            .await
            .get(&(kind, id.to_string()))
            .cloned()
            .unwrap_or(Resolution::NotFound)
    }

    async fn find_by_name(
        &self,
        _ctx: &CallContext,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ReferenceRecord>, StorageError> {
        if let Some(error) = self.next_find_error.write().await.take() {
            return Err(error);
        }

        Ok(self
            .by_name
            .read()
            .await
            .get(&(kind, name.to_string()))
            .cloned())
    }
}
