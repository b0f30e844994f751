//! Item API handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use inventory_core::{ensure_unique_barcode, CompositeItem, CompositeItemPage, Item};

use super::context::CallerContext;
use super::{storage_error_response, ErrorResponse};
use crate::state::AppState;

/// Maximum allowed page size
const MAX_LIMIT: u32 = 1000;

/// Default page size
const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListItemsParams {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    /// CQL query passed through to the storage backend.
    pub query: Option<String>,
}

/// List a page of items with their reference ids expanded.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Query(params): Query<ListItemsParams>,
) -> Result<Json<CompositeItemPage>, (StatusCode, Json<ErrorResponse>)> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let page = state
        .items()
        .list(&ctx, offset, limit, params.query.as_deref())
        .await
        .map_err(storage_error_response)?;

    Ok(Json(
        state
            .coordinator()
            .enrich_page(&ctx, page.items, page.total_records)
            .await,
    ))
}

/// Get one item with its reference ids expanded.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Result<Json<CompositeItem>, (StatusCode, Json<ErrorResponse>)> {
    let item = state
        .items()
        .get(&ctx, &id)
        .await
        .map_err(storage_error_response)?;

    Ok(Json(state.coordinator().enrich_one(&ctx, item).await))
}

/// Create an item. An id is assigned when the caller omits one.
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Json(mut item): Json<Item>,
) -> Result<(StatusCode, Json<Item>), (StatusCode, Json<ErrorResponse>)> {
    ensure_unique_barcode(state.items(), &ctx, &item)
        .await
        .map_err(storage_error_response)?;

    if item.id.is_none() {
        item.id = Some(Uuid::new_v4().to_string());
    }

    let created = state
        .items()
        .create(&ctx, &item)
        .await
        .map_err(storage_error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an item.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
    Json(mut item): Json<Item>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if let Some(ref body_id) = item.id {
        if body_id != &id {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("item id does not match the path")),
            ));
        }
    }
    item.id = Some(id);

    ensure_unique_barcode(state.items(), &ctx, &item)
        .await
        .map_err(storage_error_response)?;

    state
        .items()
        .update(&ctx, &item)
        .await
        .map_err(storage_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an item.
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .items()
        .delete(&ctx, &id)
        .await
        .map_err(storage_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete all items for the tenant.
pub async fn delete_all_items(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .items()
        .delete_all(&ctx)
        .await
        .map_err(storage_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
