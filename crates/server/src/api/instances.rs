//! Instance API handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use inventory_core::{Instance, InstancePage};

use super::context::CallerContext;
use super::{storage_error_response, ErrorResponse};
use crate::state::AppState;

const MAX_LIMIT: u32 = 1000;
const DEFAULT_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListInstancesParams {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub query: Option<String>,
}

pub async fn list_instances(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Query(params): Query<ListInstancesParams>,
) -> Result<Json<InstancePage>, (StatusCode, Json<ErrorResponse>)> {
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let page = state
        .instances()
        .list(&ctx, offset, limit, params.query.as_deref())
        .await
        .map_err(storage_error_response)?;

    Ok(Json(page))
}

pub async fn get_instance(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Result<Json<Instance>, (StatusCode, Json<ErrorResponse>)> {
    let instance = state
        .instances()
        .get(&ctx, &id)
        .await
        .map_err(storage_error_response)?;

    Ok(Json(instance))
}

pub async fn create_instance(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Json(mut instance): Json<Instance>,
) -> Result<(StatusCode, Json<Instance>), (StatusCode, Json<ErrorResponse>)> {
    if instance.title.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("instance title must not be empty")),
        ));
    }

    if instance.id.is_none() {
        instance.id = Some(Uuid::new_v4().to_string());
    }

    let created = state
        .instances()
        .create(&ctx, &instance)
        .await
        .map_err(storage_error_response)?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_instance(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
    Json(mut instance): Json<Instance>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if let Some(ref body_id) = instance.id {
        if body_id != &id {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("instance id does not match the path")),
            ));
        }
    }
    instance.id = Some(id);

    state
        .instances()
        .update(&ctx, &instance)
        .await
        .map_err(storage_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_instance(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .instances()
        .delete(&ctx, &id)
        .await
        .map_err(storage_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_all_instances(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .instances()
        .delete_all(&ctx)
        .await
        .map_err(storage_error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
