//! Record ingest API handlers.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use inventory_core::{IngestBatch, JobError, JobState};

use super::context::CallerContext;
use super::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IngestAccepted {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct IngestStatus {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Accept a batch of records for background ingest.
///
/// Returns 202 with a Location header pointing at the job status URL.
pub async fn ingest_records(
    State(state): State<Arc<AppState>>,
    CallerContext(ctx): CallerContext,
    Json(batch): Json<IngestBatch>,
) -> Result<(StatusCode, HeaderMap, Json<IngestAccepted>), (StatusCode, Json<ErrorResponse>)> {
    if batch.records.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("batch contains no records")),
        ));
    }

    let job = state.pipeline().submit(ctx, batch).await;

    let mut headers = HeaderMap::new();
    let location = format!("/inventory/ingest/status/{}", job.id);
    if let Ok(value) = location.parse() {
        headers.insert(header::LOCATION, value);
    }

    Ok((
        StatusCode::ACCEPTED,
        headers,
        Json(IngestAccepted {
            id: job.id,
            status: job.state.status_label().to_string(),
        }),
    ))
}

/// Report the state of an ingest job.
pub async fn ingest_status(
    State(state): State<Arc<AppState>>,
    CallerContext(_ctx): CallerContext,
    Path(id): Path<String>,
) -> Result<Json<IngestStatus>, (StatusCode, Json<ErrorResponse>)> {
    let job = state.job_store().get(&id).await.map_err(|e| match e {
        JobError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(e.to_string())),
        ),
        JobError::InvalidTransition { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        ),
    })?;

    let message = match &job.state {
        JobState::Failed { reason } => Some(reason.clone()),
        _ => None,
    };

    Ok(Json(IngestStatus {
        id: job.id,
        status: job.state.status_label().to_string(),
        message,
    }))
}
