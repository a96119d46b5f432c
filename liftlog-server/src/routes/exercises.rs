use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use liftlog::db::models::Exercise;
use liftlog::db::operations;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

pub async fn list_exercises(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let exercises = operations::list_exercises(&state.pool).await?;
    Ok(Json(
        exercises
            .iter()
            .map(|e| json!({ "id": e.id, "name": e.name, "category": e.category }))
            .collect::<Value>(),
    ))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(exercise_id): Path<i64>,
) -> Result<Json<Exercise>, ApiError> {
    operations::get_exercise(&state.pool, exercise_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Exercise not found".to_string()))
}
