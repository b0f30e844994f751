//! HTTP clients for the item and instance storage modules.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tracing::debug;

use super::types::{Instance, InstancePage, Item, ItemPage};
use super::StorageError;
use crate::context::{CallContext, TENANT_HEADER, TOKEN_HEADER, URL_HEADER};

fn build_client(timeout: Duration) -> Result<Client, StorageError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StorageError::Transport(e.to_string()))
}

fn with_okapi_headers(builder: RequestBuilder, ctx: &CallContext) -> RequestBuilder {
    let builder = builder
        .header(TENANT_HEADER, &ctx.tenant)
        .header(URL_HEADER, ctx.base_url());
    match &ctx.token {
        Some(token) => builder.header(TOKEN_HEADER, token),
        None => builder,
    }
}

async fn unexpected(response: reqwest::Response) -> StorageError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StorageError::UnexpectedStatus { status, message }
}

/// Item storage module client.
pub struct HttpItemStorage {
    client: Client,
}

impl HttpItemStorage {
    pub fn new(timeout: Duration) -> Result<Self, StorageError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    fn items_url(&self, ctx: &CallContext) -> String {
        format!("{}/item-storage/items", ctx.base_url())
    }
}

#[async_trait::async_trait]
impl super::ItemStorage for HttpItemStorage {
    async fn create(&self, ctx: &CallContext, item: &Item) -> Result<Item, StorageError> {
        debug!(tenant = %ctx.tenant, "creating item");

        let response = with_okapi_headers(self.client.post(self.items_url(ctx)), ctx)
            .json(item)
            .send()
            .await?;

        let status = response.status();
        if status == 422 || status == 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Validation(body));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(response.json().await?)
    }

    async fn get(&self, ctx: &CallContext, id: &str) -> Result<Item, StorageError> {
        let url = format!("{}/{}", self.items_url(ctx), id);
        let response = with_okapi_headers(self.client.get(&url), ctx).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(response.json().await?)
    }

    async fn list(
        &self,
        ctx: &CallContext,
        offset: u32,
        limit: u32,
        query: Option<&str>,
    ) -> Result<ItemPage, StorageError> {
        let mut request = with_okapi_headers(self.client.get(self.items_url(ctx)), ctx)
            .query(&[("offset", offset.to_string()), ("limit", limit.to_string())]);
        if let Some(query) = query {
            request = request.query(&[("query", query)]);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(response.json().await?)
    }

    async fn find_by_barcode(
        &self,
        ctx: &CallContext,
        barcode: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<Item>, StorageError> {
        let query = match exclude_id {
            Some(id) => format!("barcode={} and id<>{}", barcode, id),
            None => format!("barcode={}", barcode),
        };

        let url = format!(
            "{}?query={}",
            self.items_url(ctx),
            urlencoding::encode(&query)
        );
        let response = with_okapi_headers(self.client.get(&url), ctx).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        let page: ItemPage = response.json().await?;
        Ok(page.items)
    }

    async fn update(&self, ctx: &CallContext, item: &Item) -> Result<(), StorageError> {
        let id = item
            .id
            .as_deref()
            .ok_or_else(|| StorageError::Validation("item has no id".to_string()))?;

        let url = format!("{}/{}", self.items_url(ctx), id);
        let response = with_okapi_headers(self.client.put(&url), ctx)
            .json(item)
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if status == 422 || status == 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Validation(body));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(())
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), StorageError> {
        let url = format!("{}/{}", self.items_url(ctx), id);
        let response = with_okapi_headers(self.client.delete(&url), ctx)
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(())
    }

    async fn delete_all(&self, ctx: &CallContext) -> Result<(), StorageError> {
        let response = with_okapi_headers(self.client.delete(self.items_url(ctx)), ctx)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }

        Ok(())
    }
}

/// Instance storage module client.
pub struct HttpInstanceStorage {
    client: Client,
}

impl HttpInstanceStorage {
    pub fn new(timeout: Duration) -> Result<Self, StorageError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    fn instances_url(&self, ctx: &CallContext) -> String {
        format!("{}/instance-storage/instances", ctx.base_url())
    }
}

#[async_trait::async_trait]
impl super::InstanceStorage for HttpInstanceStorage {
    async fn create(
        &self,
        ctx: &CallContext,
        instance: &Instance,
    ) -> Result<Instance, StorageError> {
        debug!(tenant = %ctx.tenant, "creating instance");

        let response = with_okapi_headers(self.client.post(self.instances_url(ctx)), ctx)
            .json(instance)
            .send()
            .await?;

        let status = response.status();
        if status == 422 || status == 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Validation(body));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(response.json().await?)
    }

    async fn get(&self, ctx: &CallContext, id: &str) -> Result<Instance, StorageError> {
        let url = format!("{}/{}", self.instances_url(ctx), id);
        let response = with_okapi_headers(self.client.get(&url), ctx).send().await?;

        let status = response.status();
        if status == 404 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(response.json().await?)
    }

    async fn list(
        &self,
        ctx: &CallContext,
        offset: u32,
        limit: u32,
        query: Option<&str>,
    ) -> Result<InstancePage, StorageError> {
        let mut request = with_okapi_headers(self.client.get(self.instances_url(ctx)), ctx)
            .query(&[("offset", offset.to_string()), ("limit", limit.to_string())]);
        if let Some(query) = query {
            request = request.query(&[("query", query)]);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }

        Ok(response.json().await?)
    }

    async fn update(&self, ctx: &CallContext, instance: &Instance) -> Result<(), StorageError> {
        let id = instance
            .id
            .as_deref()
            .ok_or_else(|| StorageError::Validation("instance has no id".to_string()))?;

        let url = format!("{}/{}", self.instances_url(ctx), id);
        let response = with_okapi_headers(self.client.put(&url), ctx)
            .json(instance)
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if status == 422 || status == 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Validation(body));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(())
    }

    async fn delete(&self, ctx: &CallContext, id: &str) -> Result<(), StorageError> {
        let url = format!("{}/{}", self.instances_url(ctx), id);
        let response = with_okapi_headers(self.client.delete(&url), ctx)
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if !status.is_success() {
            return Err(unexpected(response).await);
        }

        Ok(())
    }

    async fn delete_all(&self, ctx: &CallContext) -> Result<(), StorageError> {
        let response = with_okapi_headers(self.client.delete(self.instances_url(ctx)), ctx)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }

        Ok(())
    }
}
