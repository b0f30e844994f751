//! Mock item and instance storage for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::context::CallContext;
use crate::storage::{
    Instance, InstancePage, InstanceStorage, Item, ItemPage, ItemStatus, ItemStorage, StorageError,
};

fn page_of<T: Clone>(records: &[T], offset: u32, limit: u32) -> (Vec<T>, u64) {
    let total = records.len() as u64;
    let page = records
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect();
    (page, total)
}

/// In-memory item storage.
///
/// Records keep insertion order. `set_next_error` injects a one-shot
/// failure into the next call, whatever it is.
#[derive(Default)]
pub struct MockItemStorage {
    records: Arc<RwLock<Vec<Item>>>,
    next_error: Arc<RwLock<Option<StorageError>>>,
}

impl MockItemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: StorageError) {
        *self.next_error.write().await = Some(error);
    }

    /// All stored items, in insertion order.
    pub async fn stored(&self) -> Vec<Item> {
        self.records.read().await.clone()
    }

    async fn take_error(&self) -> Result<(), StorageError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ItemStorage for MockItemStorage {
    async fn create(&self, _ctx: &CallContext, item: &Item) -> Result<Item, StorageError> {
        self.take_error().await?;

        let mut stored = item.clone();
        if stored.id.is_none() {
            stored.id = Some(Uuid::new_v4().to_string());
        }
        if stored.status.is_none() {
            stored.status = Some(ItemStatus::available());
        }
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, _ctx: &CallContext, id: &str) -> Result<Item, StorageError> {
        self.take_error().await?;

        self.records
            .read()
            .await
            .iter()
            .find(|item| item.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn list(
        &self,
        _ctx: &CallContext,
        offset: u32,
        limit: u32,
        _query: Option<&str>,
    ) -> Result<ItemPage, StorageError> {
        self.take_error().await?;

        let records = self.records.read().await;
        let (items, total_records) = page_of(&records, offset, limit);
        Ok(ItemPage {
            items,
            total_records,
        })
    }

    async fn find_by_barcode(
        &self,
        _ctx: &CallContext,
        barcode: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Item>, StorageError> {
        self.take_error().await?;

        Ok(self
            .records
            .read()
            .await
            .iter()
            .filter(|item| item.barcode.as_deref() == Some(barcode))
            .filter(|item| match exclude_id {
                Some(id) => item.id.as_deref() != Some(id),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn update(&self, _ctx: &CallContext, item: &Item) -> Result<(), StorageError> {
        self.take_error().await?;

        let id = item
            .id
            .as_deref()
            .ok_or_else(|| StorageError::Validation("item has no id".to_string()))?;

        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id.as_deref() == Some(id)) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, _ctx: &CallContext, id: &str) -> Result<(), StorageError> {
        self.take_error().await?;

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|item| item.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self, _ctx: &CallContext) -> Result<(), StorageError> {
        self.take_error().await?;
        self.records.write().await.clear();
        Ok(())
    }
}

/// In-memory instance storage.
#[derive(Default)]
pub struct MockInstanceStorage {
    records: Arc<RwLock<Vec<Instance>>>,
    next_error: Arc<RwLock<Option<StorageError>>>,
}

impl MockInstanceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_next_error(&self, error: StorageError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn stored(&self) -> Vec<Instance> {
        self.records.read().await.clone()
    }

    async fn take_error(&self) -> Result<(), StorageError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InstanceStorage for MockInstanceStorage {
    async fn create(
        &self,
        _ctx: &CallContext,
        instance: &Instance,
    ) -> Result<Instance, StorageError> {
        self.take_error().await?;

        let mut stored = instance.clone();
        if stored.id.is_none() {
            stored.id = Some(Uuid::new_v4().to_string());
        }
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, _ctx: &CallContext, id: &str) -> Result<Instance, StorageError> {
        self.take_error().await?;

        self.records
            .read()
            .await
            .iter()
            .find(|instance| instance.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    async fn list(
        &self,
        _ctx: &CallContext,
        offset: u32,
        limit: u32,
        _query: Option<&str>,
    ) -> Result<InstancePage, StorageError> {
        self.take_error().await?;

        let records = self.records.read().await;
        let (instances, total_records) = page_of(&records, offset, limit);
        Ok(InstancePage {
            instances,
            total_records,
        })
    }

    async fn update(&self, _ctx: &CallContext, instance: &Instance) -> Result<(), StorageError> {
        self.take_error().await?;

        let id = instance
            .id
            .as_deref()
            .ok_or_else(|| StorageError::Validation("instance has no id".to_string()))?;

        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id.as_deref() == Some(id)) {
            Some(existing) => {
                *existing = instance.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound(id.to_string())),
        }
    }

    async fn delete(&self, _ctx: &CallContext, id: &str) -> Result<(), StorageError> {
        self.take_error().await?;

        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|instance| instance.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_all(&self, _ctx: &CallContext) -> Result<(), StorageError> {
        self.take_error().await?;
        self.records.write().await.clear();
        Ok(())
    }
}
