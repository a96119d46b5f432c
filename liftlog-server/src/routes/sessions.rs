use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use liftlog::db::models::{NewActual, SessionTimes};
use liftlog::db::operations;
use liftlog::validate::{datetime_field, float_field, int_field, str_field, validate_field};

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::ApiError;

const TIME_FIELDS: [&str; 3] = ["scheduled_at", "started_at", "completed_at"];

const ACTUAL_FIELDS: [(&str, &str); 4] = [
    ("workout_plan_exercise_id", "int"),
    ("actual_sets", "int"),
    ("actual_reps", "int"),
    ("actual_weight", "float"),
];

fn validate_times(data: &Value, errors: &mut BTreeMap<String, String>) {
    for field in TIME_FIELDS {
        if let Some(message) = validate_field(data, field, "datetime") {
            errors.insert(field.to_string(), message);
        }
    }
}

fn validate_actual_items(data: &Value, errors: &mut BTreeMap<String, String>) {
    let Some(items) = data.get("exercises").and_then(Value::as_array) else {
        return;
    };
    for item in items {
        for (field, kind) in ACTUAL_FIELDS {
            if let Some(message) = validate_field(item, field, kind) {
                errors.insert(field.to_string(), message);
            }
        }
        if int_field(item, "workout_plan_exercise_id").is_none() {
            errors
                .entry("workout_plan_exercise_id".to_string())
                .or_insert_with(|| "'workout_plan_exercise_id' must be a valid int.".to_string());
        }
    }
}

fn parse_times(data: &Value) -> SessionTimes {
    SessionTimes {
        scheduled_at: datetime_field(data, "scheduled_at"),
        started_at: datetime_field(data, "started_at"),
        completed_at: datetime_field(data, "completed_at"),
    }
}

fn parse_actuals(data: &Value) -> Vec<NewActual> {
    data.get("exercises")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| NewActual {
                    workout_plan_exercise_id: int_field(item, "workout_plan_exercise_id")
                        .unwrap_or_default(),
                    actual_sets: int_field(item, "actual_sets").unwrap_or(1),
                    actual_reps: int_field(item, "actual_reps").unwrap_or(1),
                    actual_weight: float_field(item, "actual_weight").unwrap_or(1.0),
                    notes: str_field(item, "notes").map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Run every field check for a session payload up front so the client gets
/// all problems in one response.
fn validate_session_payload(data: &Value) -> Result<(), ApiError> {
    let mut errors = BTreeMap::new();
    validate_times(data, &mut errors);
    validate_actual_items(data, &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    Ok(())
}

pub async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let sessions = operations::list_sessions_for_user(&state.pool, user.id).await?;
    Ok(Json(
        sessions
            .iter()
            .map(|s| {
                json!({
                    "id": s.id,
                    "workout_plan_id": s.workout_plan_id,
                    "scheduled_at": s.scheduled_at,
                })
            })
            .collect::<Value>(),
    ))
}

pub async fn create_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(plan_id): Path<i64>,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    validate_session_payload(&data)?;
    let times = parse_times(&data);
    let actuals = parse_actuals(&data);

    let session_id =
        operations::create_session(&state.pool, user.id, plan_id, &times, &actuals).await?;
    Ok(Json(json!({
        "message": "Workout session created successfully",
        "id": session_id,
    })))
}

pub async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((plan_id, session_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    let Some(session) = operations::get_session(&state.pool, user.id, plan_id, session_id).await?
    else {
        return Err(ApiError::NotFound(format!(
            "No workout session with id {session_id} for this user."
        )));
    };
    let actuals = operations::session_actuals(&state.pool, session.id).await?;

    Ok(Json(json!({
        "workout_session": {
            "workout_session_id": session.id,
            "workout_plan_id": session.workout_plan_id,
            "scheduled_at": session.scheduled_at,
            "started_at": session.started_at,
            "completed_at": session.completed_at,
            "session_exercises": actuals,
        }
    })))
}

pub async fn update_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((plan_id, session_id)): Path<(i64, i64)>,
    Json(data): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    validate_session_payload(&data)?;
    let times = parse_times(&data);
    let actuals = parse_actuals(&data);

    operations::update_session(&state.pool, user.id, plan_id, session_id, &times, &actuals).await?;
    Ok(Json(json!({ "message": "Workout session updated successfully" })))
}

pub async fn delete_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((plan_id, session_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    operations::delete_session(&state.pool, user.id, plan_id, session_id).await?;
    Ok(Json(json!({
        "message": format!("Workout session with id {session_id} successfully deleted.")
    })))
}
