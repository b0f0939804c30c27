//! Suggestion box API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{current_revision, error, success, ApiResult};
use crate::ledger::rules;
use crate::models::{
    CreateSuggestionRequest, Suggestion, SuggestionOutcome, UpdateSuggestionStatusRequest,
};
use crate::AppState;

/// GET /api/suggestions - List all suggestions, newest first.
pub async fn list_suggestions(State(state): State<AppState>) -> ApiResult<Vec<Suggestion>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.repo().list_suggestions().await {
        Ok(suggestions) => success(suggestions, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/suggestions - Submit a suggestion and credit its author.
pub async fn submit_suggestion(
    State(state): State<AppState>,
    Json(request): Json<CreateSuggestionRequest>,
) -> ApiResult<SuggestionOutcome> {
    let revision_id = current_revision(&state).await;

    let text = match rules::validate_suggestion_text(&request.text) {
        Ok(text) => text,
        Err(e) => return error(e, revision_id),
    };

    match state
        .ledger
        .submit_suggestion(&request.author_id, text, request.is_anonymous)
        .await
    {
        Ok(outcome) => {
            let new_revision = state.ledger.revision_id().await.unwrap_or(revision_id);
            success(outcome, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/suggestions/:id/status - Moderate a suggestion.
pub async fn update_suggestion_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSuggestionStatusRequest>,
) -> ApiResult<Vec<Suggestion>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.transition_suggestion(&id, request.status).await {
        Ok(suggestions) => {
            let new_revision = state.ledger.revision_id().await.unwrap_or(revision_id);
            success(suggestions, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/suggestions/:id - Delete a closed suggestion.
pub async fn delete_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Suggestion>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.delete_suggestion(&id).await {
        Ok(suggestions) => {
            let new_revision = state.ledger.revision_id().await.unwrap_or(revision_id);
            success(suggestions, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
