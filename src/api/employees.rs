//! Employee API endpoints: profile, wallet history, catalog and feed.

use axum::extract::{Path, Query, State};

use super::{current_revision, error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CatalogItem, Employee, FeedItem, FeedQuery, LeaderboardEntry, RedemptionRecord,
};
use crate::AppState;

/// GET /api/employees - List all employees.
pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Vec<Employee>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.repo().list_employees().await {
        Ok(employees) => success(employees, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/employees/:id - Get a single employee.
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Employee> {
    let revision_id = current_revision(&state).await;

    match state.ledger.repo().get_employee(&id).await {
        Ok(Some(employee)) => success(employee, revision_id),
        Ok(None) => error(
            AppError::NotFound(format!("Employee {} not found", id)),
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/employees/:id/redemptions - Paid and received rewards.
pub async fn list_employee_redemptions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<RedemptionRecord>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.redemptions_for(&id).await {
        Ok(records) => success(records, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/employees/:id/rewards - Catalog with affordability.
pub async fn list_employee_rewards(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<CatalogItem>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.catalog_for(&id, &state.catalog).await {
        Ok(items) => success(items, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/employees/:id/feed - News feed with potential awards.
pub async fn get_feed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Vec<FeedItem>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.news_feed(&id, query.filter).await {
        Ok(items) => success(items, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/leaderboard - Ranking of non-admin employees.
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<Vec<LeaderboardEntry>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.leaderboard().await {
        Ok(entries) => success(entries, revision_id),
        Err(e) => error(e, revision_id),
    }
}
