//! REST API module.
//!
//! Handlers for the kiosk and admin screens, all answering with the
//! `{ success, data, revisionId }` envelope.

mod auth;
mod datastore;
mod employees;
mod news;
mod rewards;
mod suggestions;

pub use auth::*;
pub use datastore::*;
pub use employees::*;
pub use news::*;
pub use rewards::*;
pub use suggestions::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Revision to report alongside a response; 0 if it cannot be read.
pub async fn current_revision(state: &crate::AppState) -> i64 {
    match state.ledger.revision_id().await {
        Ok(revision_id) => revision_id,
        Err(e) => {
            tracing::warn!("Failed to read revision: {}", e);
            0
        }
    }
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}
