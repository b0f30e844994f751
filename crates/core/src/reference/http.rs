//! HTTP reference resolver backed by the type storage modules.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ReferenceKind, ReferenceRecord, ReferenceResolver, Resolution};
use crate::context::{CallContext, TENANT_HEADER, TOKEN_HEADER, URL_HEADER};
use crate::metrics::{LOOKUP_DURATION, REFERENCE_LOOKUPS};
use crate::storage::StorageError;

#[derive(Debug, Deserialize)]
struct WireRecord {
    id: String,
    name: String,
}

impl From<WireRecord> for ReferenceRecord {
    fn from(w: WireRecord) -> Self {
        ReferenceRecord {
            id: w.id,
            name: w.name,
        }
    }
}

/// Resolver that queries the material type and loan type storage modules.
pub struct HttpReferenceResolver {
    client: Client,
}

impl HttpReferenceResolver {
    pub fn new(timeout: Duration) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    fn with_okapi_headers(&self, builder: RequestBuilder, ctx: &CallContext) -> RequestBuilder {
        let builder = builder
            .header(TENANT_HEADER, &ctx.tenant)
            .header(URL_HEADER, ctx.base_url());
        match &ctx.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }
}

#[async_trait::async_trait]
impl ReferenceResolver for HttpReferenceResolver {
    async fn resolve(&self, ctx: &CallContext, kind: ReferenceKind, id: &str) -> Resolution {
        let url = format!("{}/{}/{}", ctx.base_url(), kind.path(), id);
        debug!(kind = kind.label(), id, "resolving reference");

        let timer = LOOKUP_DURATION
            .with_label_values(&[kind.label()])
            .start_timer();

        let outcome = match self.with_okapi_headers(self.client.get(&url), ctx).send().await {
            Ok(response) => {
                let status = response.status();
                if status == 404 {
                    Resolution::NotFound
                } else if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    Resolution::Failed(format!("status {}: {}", status.as_u16(), message))
                } else {
                    match response.json::<WireRecord>().await {
                        Ok(record) => Resolution::Found(record.into()),
                        Err(e) => Resolution::Failed(format!("malformed record: {}", e)),
                    }
                }
            }
            Err(e) => Resolution::Failed(e.to_string()),
        };

        timer.observe_duration();
        REFERENCE_LOOKUPS
            .with_label_values(&[kind.label(), outcome.label()])
            .inc();

        if let Resolution::Failed(ref reason) = outcome {
            warn!(kind = kind.label(), id, reason, "reference lookup failed");
        }

        outcome
    }

    async fn find_by_name(
        &self,
        ctx: &CallContext,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ReferenceRecord>, StorageError> {
        let query = format!(r#"name="{}""#, name);
        let url = format!(
            "{}/{}?query={}",
            ctx.base_url(),
            kind.path(),
            urlencoding::encode(&query)
        );

        let response = self
            .with_okapi_headers(self.client.get(&url), ctx)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }

        // The record array key differs per vocabulary ("mtypes"/"loantypes").
        let body: serde_json::Value = response.json().await?;
        let records = body
            .get(kind.collection_key())
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let Some(first) = records.into_iter().next() else {
            return Ok(None);
        };

        let record: WireRecord = serde_json::from_value(first)
            .map_err(|e| StorageError::Transport(format!("malformed record: {}", e)))?;
        Ok(Some(record.into()))
    }
}
