use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use liftlog::db::models::NewTarget;
use liftlog::db::operations;
use liftlog::validate::{float_field, int_field, str_field, validate_field};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

const TARGET_FIELDS: [(&str, &str); 4] = [
    ("exercise_id", "int"),
    ("target_sets", "int"),
    ("target_reps", "int"),
    ("target_weight", "float"),
];

/// Validate and extract the optional `exercises` target list. All field
/// errors across all items are collected before rejecting.
fn parse_targets(data: &Value) -> Result<Vec<NewTarget>, ApiError> {
    let Some(items) = data.get("exercises").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut errors = BTreeMap::new();
    let mut targets = Vec::new();
    for item in items {
        for (field, kind) in TARGET_FIELDS {
            if let Some(message) = validate_field(item, field, kind) {
                errors.insert(field.to_string(), message);
            }
        }
        // exercise_id is the one target field that cannot default.
        if int_field(item, "exercise_id").is_none() {
            errors
                .entry("exercise_id".to_string())
                .or_insert_with(|| "'exercise_id' must be a valid int.".to_string());
        }
        if errors.is_empty() {
            targets.push(NewTarget {
                exercise_id: int_field(item, "exercise_id").unwrap_or_default(),
                target_sets: int_field(item, "target_sets").unwrap_or(1),
                target_reps: int_field(item, "target_reps").unwrap_or(1),
                target_weight: float_field(item, "target_weight").unwrap_or(1.0),
            });
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    Ok(targets)
}

pub async fn list_plans(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let plans = operations::list_plans(&state.pool, user.id).await?;
    if plans.is_empty() {
        return Ok(Json(json!({ "message": "No workout plans found for the user." })));
    }
    Ok(Json(
        plans
            .iter()
            .map(|p| json!({ "id": p.id, "name": p.name, "created_at": p.created_at }))
            .collect::<Value>(),
    ))
}

pub async fn create_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let Some(name) = str_field(&data, "name") else {
        return Err(ApiError::BadRequest(
            "Workout plan name must be provided.".to_string(),
        ));
    };
    let targets = parse_targets(&data)?;

    let plan_id = operations::create_plan(&state.pool, user.id, name, &targets).await?;
    Ok(Json(json!({
        "message": format!("Workout plan added successfully with id {plan_id}"),
        "id": plan_id,
    })))
}

pub async fn get_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let Some(plan) = operations::get_plan(&state.pool, user.id, plan_id).await? else {
        return Err(ApiError::NotFound(format!(
            "No workout plan with id {plan_id} for this user."
        )));
    };
    let exercises = operations::plan_targets(&state.pool, plan.id).await?;

    Ok(Json(json!({
        "workout": {
            "workout_plan_id": plan.id,
            "name": plan.name,
            "created_at": plan.created_at,
            "updated_at": plan.updated_at,
            "exercises": exercises,
        }
    })))
}

pub async fn update_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<i64>,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let name = str_field(&data, "name");
    let targets = parse_targets(&data)?;

    operations::update_plan(&state.pool, user.id, plan_id, name, &targets).await?;
    Ok(Json(json!({ "message": "Workout plan updated successfully" })))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    operations::delete_plan(&state.pool, user.id, plan_id).await?;
    Ok(Json(json!({
        "message": format!("Workout plan with id {plan_id} successfully deleted.")
    })))
}
