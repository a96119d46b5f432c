use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

// User models
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
}

// Exercise catalog models
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub muscle_group: Option<String>,
}

#[derive(Debug)]
pub struct NewExercise {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub muscle_group: Option<String>,
}

// Workout plan models
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkoutPlan {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkoutPlanExercise {
    pub id: i64,
    pub workout_plan_id: i64,
    pub exercise_id: i64,
    pub target_sets: i64,
    pub target_reps: i64,
    pub target_weight: f64,
}

/// Target values for one exercise within a plan, as supplied by a client.
/// Unset numeric fields default to sets=1, reps=1, weight=1.0 (policy).
#[derive(Debug, Clone)]
pub struct NewTarget {
    pub exercise_id: i64,
    pub target_sets: i64,
    pub target_reps: i64,
    pub target_weight: f64,
}

// Workout session models
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkoutSession {
    pub id: i64,
    pub workout_plan_id: i64,
    pub scheduled_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

/// Session timestamps for creation (absent fields stay NULL) and for
/// patching (absent fields keep their stored value).
#[derive(Debug, Clone, Default)]
pub struct SessionTimes {
    pub scheduled_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionExercise {
    pub id: i64,
    pub workout_session_id: i64,
    pub workout_plan_exercise_id: i64,
    pub actual_sets: i64,
    pub actual_reps: i64,
    pub actual_weight: f64,
    pub notes: Option<String>,
}

/// Recorded actuals for one target row within a session, as supplied by a
/// client. Same numeric defaults as targets.
#[derive(Debug, Clone)]
pub struct NewActual {
    pub workout_plan_exercise_id: i64,
    pub actual_sets: i64,
    pub actual_reps: i64,
    pub actual_weight: f64,
    pub notes: Option<String>,
}

/// One plan target joined with its catalog exercise, for plan detail
/// responses and reports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TargetDetail {
    #[serde(rename = "id")]
    pub exercise_id: i64,
    pub workout_plan_exercise_id: i64,
    pub name: String,
    pub target_sets: i64,
    pub target_reps: i64,
    pub target_weight: f64,
}

/// One recorded actual joined through its target row to the exercise name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActualDetail {
    pub id: i64,
    #[serde(skip_serializing)]
    pub workout_session_id: i64,
    pub workout_plan_exercise_id: i64,
    pub exercise_name: String,
    pub actual_sets: i64,
    pub actual_reps: i64,
    pub actual_weight: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub id: i64,
    pub scheduled_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub exercises: Vec<ActualDetail>,
}

/// Aggregate view of a plan: its targets and every session with actuals.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub id: i64,
    pub name: String,
    pub exercises: Vec<TargetDetail>,
    pub sessions: Vec<SessionReport>,
}
