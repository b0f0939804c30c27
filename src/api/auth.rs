//! Kiosk login endpoint.

use axum::{extract::State, Json};

use super::{current_revision, error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Employee, LoginRequest};
use crate::AppState;

/// POST /api/login - Check an employee id and pin.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Employee> {
    let revision_id = current_revision(&state).await;

    if request.employee_id.trim().is_empty() {
        return error(
            AppError::Validation("employeeId is required".to_string()),
            revision_id,
        );
    }

    match state
        .ledger
        .authenticate(request.employee_id.trim(), &request.pin)
        .await
    {
        Ok(employee) => success(employee, revision_id),
        Err(e) => error(e, revision_id),
    }
}
