//! News API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{current_revision, error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{ArticleSummary, CreateArticleRequest, NewsArticle, VoteOutcome, VoteRequest};
use crate::AppState;

/// GET /api/news - List all articles, newest first.
pub async fn list_news(State(state): State<AppState>) -> ApiResult<Vec<NewsArticle>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.repo().list_news().await {
        Ok(news) => success(news, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/news - Publish an article. Returns the updated news list.
pub async fn create_article(
    State(state): State<AppState>,
    Json(request): Json<CreateArticleRequest>,
) -> ApiResult<Vec<NewsArticle>> {
    let revision_id = current_revision(&state).await;

    // Validate required fields
    if request.title.trim().is_empty() {
        return error(
            AppError::Validation("Title is required".to_string()),
            revision_id,
        );
    }
    if request.content.trim().is_empty() {
        return error(
            AppError::Validation("Content is required".to_string()),
            revision_id,
        );
    }

    match state.ledger.create_article(&request).await {
        Ok(news) => {
            let new_revision = state.ledger.revision_id().await.unwrap_or(revision_id);
            success(news, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/news/:id/votes - Mark an article as read by an employee.
pub async fn vote_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> ApiResult<VoteOutcome> {
    let revision_id = current_revision(&state).await;

    match state
        .ledger
        .vote_article(&request.employee_id, &id, request.claimed_points)
        .await
    {
        Ok(outcome) => {
            let new_revision = state.ledger.revision_id().await.unwrap_or(revision_id);
            success(outcome, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/news/:id/summary - Short summary of the article body.
pub async fn summarize_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ArticleSummary> {
    let revision_id = current_revision(&state).await;

    let article = match state.ledger.repo().get_article(&id).await {
        Ok(Some(article)) => article,
        Ok(None) => {
            return error(
                AppError::NotFound(format!("Article {} not found", id)),
                revision_id,
            )
        }
        Err(e) => return error(e, revision_id),
    };

    let summary = state.summarizer.summarize(&article.content).await;
    success(
        ArticleSummary {
            article_id: article.id,
            summary,
        },
        revision_id,
    )
}
