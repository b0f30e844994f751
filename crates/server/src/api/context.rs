//! Per-request caller context extraction.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;

use inventory_core::{CallContext, TENANT_HEADER, TOKEN_HEADER, URL_HEADER};

use super::ErrorResponse;
use crate::state::AppState;

/// Extracts the Okapi headers into a [`CallContext`].
///
/// The tenant header is mandatory. The storage URL falls back to the
/// configured default when the caller does not override it.
pub struct CallerContext(pub CallContext);

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl FromRequestParts<Arc<AppState>> for CallerContext {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(tenant) = header_value(parts, TENANT_HEADER) else {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!(
                    "missing required header: {}",
                    TENANT_HEADER
                ))),
            ));
        };

        let storage_base_url = header_value(parts, URL_HEADER)
            .unwrap_or_else(|| state.config().storage.base_url.clone());

        let mut ctx = CallContext::new(tenant, storage_base_url);
        if let Some(token) = header_value(parts, TOKEN_HEADER) {
            ctx = ctx.with_token(token);
        }

        Ok(CallerContext(ctx))
    }
}
