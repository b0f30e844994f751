pub mod context;
pub mod handlers;
pub mod ingest;
pub mod instances;
pub mod items;
pub mod middleware;
pub mod routes;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use inventory_core::StorageError;
use serde::Serialize;

/// Error response body shared by all API handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Map a storage error to its HTTP representation.
///
/// Backend unavailability surfaces as 502: the record state is unknown
/// and the caller should retry, which a 500 would not suggest.
pub fn storage_error_response(e: StorageError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        StorageError::Validation(_) => StatusCode::BAD_REQUEST,
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::Transport(_) | StorageError::UnexpectedStatus { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}
