//! Storage module clients.
//!
//! Items and instances live in separate storage modules reached over HTTP.
//! The traits here are the seams the server and the ingest pipeline are
//! built against; `http` holds the real clients.

mod http;
mod types;

pub use http::{HttpInstanceStorage, HttpItemStorage};
pub use types::{Instance, InstancePage, Item, ItemPage, ItemStatus};

use async_trait::async_trait;
use thiserror::Error;

use crate::context::CallContext;

/// Error type for storage operations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The record was rejected before or by the backend.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No record with the given id.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The backend could not be reached.
    #[error("storage request failed: {0}")]
    Transport(String),

    /// The backend answered with a status we did not expect.
    #[error("unexpected status {status} from storage: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        StorageError::Transport(e.to_string())
    }
}

/// Item storage backend.
#[async_trait]
pub trait ItemStorage: Send + Sync {
    /// Create an item, returning the stored representation.
    async fn create(&self, ctx: &CallContext, item: &Item) -> Result<Item, StorageError>;

    /// Get an item by id.
    async fn get(&self, ctx: &CallContext, id: &str) -> Result<Item, StorageError>;

    /// List a page of items, optionally filtered by a CQL query.
    async fn list(
        &self,
        ctx: &CallContext,
        offset: u32,
        limit: u32,
        query: Option<&str>,
    ) -> Result<ItemPage, StorageError>;

    /// Find items carrying the given barcode, optionally excluding one id.
    async fn find_by_barcode(
        &self,
        ctx: &CallContext,
        barcode: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Item>, StorageError>;

    /// Replace an existing item.
    async fn update(&self, ctx: &CallContext, item: &Item) -> Result<(), StorageError>;

    /// Delete an item by id.
    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), StorageError>;

    /// Delete all items for the tenant.
    async fn delete_all(&self, ctx: &CallContext) -> Result<(), StorageError>;
}

/// Instance storage backend.
#[async_trait]
pub trait InstanceStorage: Send + Sync {
    /// Create an instance, returning the stored representation.
    async fn create(&self, ctx: &CallContext, instance: &Instance)
        -> Result<Instance, StorageError>;

    /// Get an instance by id.
    async fn get(&self, ctx: &CallContext, id: &str) -> Result<Instance, StorageError>;

    /// List a page of instances, optionally filtered by a CQL query.
    async fn list(
        &self,
        ctx: &CallContext,
        offset: u32,
        limit: u32,
        query: Option<&str>,
    ) -> Result<InstancePage, StorageError>;

    /// Replace an existing instance.
    async fn update(&self, ctx: &CallContext, instance: &Instance) -> Result<(), StorageError>;

    /// Delete an instance by id.
    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), StorageError>;

    /// Delete all instances for the tenant.
    async fn delete_all(&self, ctx: &CallContext) -> Result<(), StorageError>;
}

/// Reject an item whose barcode is already assigned to a different item.
///
/// On create `item.id` may be absent; on update the item's own id is
/// excluded from the check so a record can keep its barcode.
pub async fn ensure_unique_barcode(
    storage: &dyn ItemStorage,
    ctx: &CallContext,
    item: &Item,
) -> Result<(), StorageError> {
    let Some(ref barcode) = item.barcode else {
        return Ok(());
    };

    let matches = storage
        .find_by_barcode(ctx, barcode, item.id.as_deref())
        .await?;

    if matches.is_empty() {
        Ok(())
    } else {
        Err(StorageError::Validation(format!(
            "barcode {} is already assigned to another item",
            barcode
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockItemStorage;

    fn ctx() -> CallContext {
        CallContext::new("diku", "http://localhost:9130")
    }

    fn item_with_barcode(id: Option<&str>, barcode: &str) -> Item {
        Item {
            id: id.map(str::to_string),
            barcode: Some(barcode.to_string()),
            ..Item::default()
        }
    }

    #[tokio::test]
    async fn test_unique_barcode_passes_when_unused() {
        let storage = MockItemStorage::new();
        let item = item_with_barcode(None, "1000");
        assert!(ensure_unique_barcode(&storage, &ctx(), &item).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected_on_create() {
        let storage = MockItemStorage::new();
        storage
            .create(&ctx(), &item_with_barcode(Some("existing"), "1000"))
            .await
            .unwrap();

        let item = item_with_barcode(None, "1000");
        let err = ensure_unique_barcode(&storage, &ctx(), &item)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[tokio::test]
    async fn test_item_keeps_its_own_barcode_on_update() {
        let storage = MockItemStorage::new();
        storage
            .create(&ctx(), &item_with_barcode(Some("it-1"), "1000"))
            .await
            .unwrap();

        // same item, same barcode: the id exclusion must let it through
        let item = item_with_barcode(Some("it-1"), "1000");
        assert!(ensure_unique_barcode(&storage, &ctx(), &item).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_barcode_held_by_other_item() {
        let storage = MockItemStorage::new();
        storage
            .create(&ctx(), &item_with_barcode(Some("it-1"), "1000"))
            .await
            .unwrap();

        let item = item_with_barcode(Some("it-2"), "1000");
        let err = ensure_unique_barcode(&storage, &ctx(), &item)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }
}
