//! Reward catalog and redemption endpoints.

use axum::{extract::State, Json};

use super::{current_revision, error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{RedeemRequest, RedemptionOutcome, RedemptionRecord, Reward};
use crate::AppState;

/// GET /api/rewards - The reward catalog, cheapest first.
pub async fn list_rewards(State(state): State<AppState>) -> ApiResult<Vec<Reward>> {
    let revision_id = current_revision(&state).await;
    success(state.catalog.rewards().to_vec(), revision_id)
}

/// GET /api/redemptions - Every redemption leg, newest first.
pub async fn list_redemptions(State(state): State<AppState>) -> ApiResult<Vec<RedemptionRecord>> {
    let revision_id = current_revision(&state).await;

    match state.ledger.repo().list_redemptions().await {
        Ok(records) => success(records, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/redemptions - Redeem a reward, optionally sharing a gift.
pub async fn redeem_reward(
    State(state): State<AppState>,
    Json(request): Json<RedeemRequest>,
) -> ApiResult<RedemptionOutcome> {
    let revision_id = current_revision(&state).await;

    let Some(reward) = state.catalog.find(&request.reward_id) else {
        return error(
            AppError::NotFound(format!("Reward {} not found", request.reward_id)),
            revision_id,
        );
    };
    let Some(mode) = request.redemption_mode() else {
        return error(
            AppError::Validation("targetSector is required for shared redemptions".to_string()),
            revision_id,
        );
    };

    match state
        .ledger
        .redeem_reward(&request.employee_id, reward, mode)
        .await
    {
        Ok(outcome) => {
            let new_revision = state.ledger.revision_id().await.unwrap_or(revision_id);
            success(outcome, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
