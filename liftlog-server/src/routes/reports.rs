use axum::Json;
use axum::extract::{Path, State};

use liftlog::db::models::PlanReport;
use liftlog::db::operations;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

pub async fn plan_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<i64>,
) -> Result<Json<PlanReport>, ApiError> {
    operations::plan_report(&state.pool, user.id, plan_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Workout plan not found".to_string()))
}
