//! Datastore and analytics endpoints.

use axum::extract::State;

use super::{current_revision, error, success, ApiResult};
use crate::models::{Analytics, Datastore, RevisionInfo};
use crate::AppState;

/// GET /api/datastore - Consistent snapshot of the whole ledger.
pub async fn get_datastore(State(state): State<AppState>) -> ApiResult<Datastore> {
    let datastore = state
        .ledger
        .repo()
        .get_datastore()
        .await
        .map_err(|e| crate::errors::AppErrorWithRevision {
            error: e,
            revision_id: 0,
        })?;

    let revision_id = datastore.revision_id;
    success(datastore, revision_id)
}

/// GET /api/datastore/revision - Get the current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let revision_info = state
        .ledger
        .repo()
        .get_revision_info()
        .await
        .map_err(|e| crate::errors::AppErrorWithRevision {
            error: e,
            revision_id: 0,
        })?;

    let revision_id = revision_info.revision_id;
    success(revision_info, revision_id)
}

/// GET /api/analytics - Admin dashboard totals.
pub async fn get_analytics(State(state): State<AppState>) -> ApiResult<Analytics> {
    let revision_id = current_revision(&state).await;

    match state.ledger.analytics().await {
        Ok(analytics) => success(analytics, revision_id),
        Err(e) => error(e, revision_id),
    }
}
