//! Cross-entity consistency check for recorded actuals.
//!
//! A `session_exercises` row ties a session to a plan target. Nothing in the
//! schema alone stops a client from pairing a session with a target row from
//! a different plan; this guard does, and it runs inside the same transaction
//! as the write it protects so a failure discards the whole request.

use sqlx::SqliteConnection;

use crate::error::StoreError;

/// Verify that `workout_plan_exercise_id` and `workout_session_id` belong to
/// the same workout plan before an actual is written.
///
/// Call order matters for error reporting: a dangling target reference is
/// reported before a dangling session reference, and a plan mismatch only
/// after both rows exist.
pub async fn check_session_actual(
    conn: &mut SqliteConnection,
    workout_session_id: i64,
    workout_plan_exercise_id: i64,
) -> Result<(), StoreError> {
    let target_plan: Option<i64> =
        sqlx::query_scalar("SELECT workout_plan_id FROM workout_plan_exercises WHERE id = ?1")
            .bind(workout_plan_exercise_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(target_plan) = target_plan else {
        return Err(StoreError::invalid_reference("Invalid workout exercise."));
    };

    let session_plan: Option<i64> =
        sqlx::query_scalar("SELECT workout_plan_id FROM workout_sessions WHERE id = ?1")
            .bind(workout_session_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(session_plan) = session_plan else {
        return Err(StoreError::invalid_reference("Invalid workout session."));
    };

    if target_plan != session_plan {
        return Err(StoreError::CrossPlanMismatch);
    }

    Ok(())
}
