use sqlx::SqlitePool;

use crate::db::consistency::check_session_actual;
use crate::db::models::{
    ActualDetail, Exercise, NewActual, NewExercise, NewTarget, NewUser, PlanReport, SessionExercise,
    SessionReport, SessionTimes, TargetDetail, User, WorkoutPlan, WorkoutSession,
};
use crate::error::StoreError;

// Users

pub async fn create_user(pool: &SqlitePool, new: &NewUser) -> Result<User, StoreError> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (name, surname, email, password_hash)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id, name, surname, email, password_hash",
    )
    .bind(&new.name)
    .bind(&new.surname)
    .bind(&new.email)
    .bind(&new.password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::EmailTaken,
        _ => StoreError::Database(e),
    })
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, StoreError> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, surname, email, password_hash FROM users WHERE email = ?1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, StoreError> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, surname, email, password_hash FROM users WHERE id = ?1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

// Exercise catalog

pub async fn list_exercises(pool: &SqlitePool) -> Result<Vec<Exercise>, StoreError> {
    sqlx::query_as::<_, Exercise>(
        "SELECT id, name, description, category, muscle_group FROM exercises ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_exercise(pool: &SqlitePool, exercise_id: i64) -> Result<Option<Exercise>, StoreError> {
    sqlx::query_as::<_, Exercise>(
        "SELECT id, name, description, category, muscle_group FROM exercises WHERE id = ?1",
    )
    .bind(exercise_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

pub async fn create_exercise(pool: &SqlitePool, new: &NewExercise) -> Result<Exercise, StoreError> {
    sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (name, description, category, muscle_group)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id, name, description, category, muscle_group",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.category)
    .bind(&new.muscle_group)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

// Workout plans

pub async fn list_plans(pool: &SqlitePool, user_id: i64) -> Result<Vec<WorkoutPlan>, StoreError> {
    sqlx::query_as::<_, WorkoutPlan>(
        "SELECT id, user_id, name, created_at, updated_at
         FROM workout_plans
         WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_plan(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
) -> Result<Option<WorkoutPlan>, StoreError> {
    sqlx::query_as::<_, WorkoutPlan>(
        "SELECT id, user_id, name, created_at, updated_at
         FROM workout_plans
         WHERE id = ?1 AND user_id = ?2",
    )
    .bind(plan_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// Create a plan and its target rows in one transaction. A target whose
/// `exercise_id` is not in the catalog aborts the whole write.
pub async fn create_plan(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
    targets: &[NewTarget],
) -> Result<i64, StoreError> {
    let mut tx = pool.begin().await?;

    let plan_id: i64 =
        sqlx::query_scalar("INSERT INTO workout_plans (user_id, name) VALUES (?1, ?2) RETURNING id")
            .bind(user_id)
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

    for target in targets {
        ensure_exercise_exists(&mut tx, target.exercise_id).await?;
        sqlx::query(
            "INSERT INTO workout_plan_exercises
                 (workout_plan_id, exercise_id, target_sets, target_reps, target_weight)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(plan_id)
        .bind(target.exercise_id)
        .bind(target.target_sets)
        .bind(target.target_reps)
        .bind(target.target_weight)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(plan_id)
}

/// Rename a plan and/or upsert targets, keyed by `exercise_id` within the
/// plan: an existing row is updated in place, a new one inserted. Targets
/// are never removed by an update.
pub async fn update_plan(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    name: Option<&str>,
    targets: &[NewTarget],
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    let owned: Option<i64> =
        sqlx::query_scalar("SELECT id FROM workout_plans WHERE id = ?1 AND user_id = ?2")
            .bind(plan_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Err(StoreError::not_found(format!(
            "No workout plan with id {plan_id} for this user."
        )));
    }

    if let Some(name) = name {
        sqlx::query("UPDATE workout_plans SET name = ?1 WHERE id = ?2")
            .bind(name)
            .bind(plan_id)
            .execute(&mut *tx)
            .await?;
    }

    for target in targets {
        ensure_exercise_exists(&mut tx, target.exercise_id).await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM workout_plan_exercises WHERE workout_plan_id = ?1 AND exercise_id = ?2",
        )
        .bind(plan_id)
        .bind(target.exercise_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(row_id) => {
                sqlx::query(
                    "UPDATE workout_plan_exercises
                     SET target_sets = ?1, target_reps = ?2, target_weight = ?3
                     WHERE id = ?4",
                )
                .bind(target.target_sets)
                .bind(target.target_reps)
                .bind(target.target_weight)
                .bind(row_id)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO workout_plan_exercises
                         (workout_plan_id, exercise_id, target_sets, target_reps, target_weight)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .bind(plan_id)
                .bind(target.exercise_id)
                .bind(target.target_sets)
                .bind(target.target_reps)
                .bind(target.target_weight)
                .execute(&mut *tx)
                .await?;
            }
        }
    }

    sqlx::query("UPDATE workout_plans SET updated_at = datetime('now') WHERE id = ?1")
        .bind(plan_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Delete a plan; `ON DELETE CASCADE` removes its targets, sessions and
/// recorded actuals.
pub async fn delete_plan(pool: &SqlitePool, user_id: i64, plan_id: i64) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM workout_plans WHERE id = ?1 AND user_id = ?2")
        .bind(plan_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(format!(
            "No workout plan with id {plan_id} for this user."
        )));
    }
    Ok(())
}

pub async fn plan_targets(pool: &SqlitePool, plan_id: i64) -> Result<Vec<TargetDetail>, StoreError> {
    sqlx::query_as::<_, TargetDetail>(
        "SELECT wpe.exercise_id, wpe.id AS workout_plan_exercise_id, e.name,
                wpe.target_sets, wpe.target_reps, wpe.target_weight
         FROM workout_plan_exercises wpe
         JOIN exercises e ON wpe.exercise_id = e.id
         WHERE wpe.workout_plan_id = ?1
         ORDER BY wpe.id",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

// Workout sessions

pub async fn list_sessions_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<WorkoutSession>, StoreError> {
    sqlx::query_as::<_, WorkoutSession>(
        "SELECT ws.id, ws.workout_plan_id, ws.scheduled_at, ws.started_at, ws.completed_at
         FROM workout_sessions ws
         JOIN workout_plans wp ON ws.workout_plan_id = wp.id
         WHERE wp.user_id = ?1
         ORDER BY ws.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn get_session(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    session_id: i64,
) -> Result<Option<WorkoutSession>, StoreError> {
    sqlx::query_as::<_, WorkoutSession>(
        "SELECT ws.id, ws.workout_plan_id, ws.scheduled_at, ws.started_at, ws.completed_at
         FROM workout_sessions ws
         JOIN workout_plans wp ON ws.workout_plan_id = wp.id
         WHERE ws.id = ?1 AND ws.workout_plan_id = ?2 AND wp.user_id = ?3",
    )
    .bind(session_id)
    .bind(plan_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// Create a session under a plan the user owns, recording any supplied
/// actuals in the same transaction. Every actual passes the consistency
/// guard; any failure rolls back the session row too.
pub async fn create_session(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    times: &SessionTimes,
    actuals: &[NewActual],
) -> Result<i64, StoreError> {
    let mut tx = pool.begin().await?;

    let owned: Option<i64> =
        sqlx::query_scalar("SELECT id FROM workout_plans WHERE id = ?1 AND user_id = ?2")
            .bind(plan_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Err(StoreError::not_found(format!(
            "No workout plan with id {plan_id} for this user."
        )));
    }

    let session_id: i64 = sqlx::query_scalar(
        "INSERT INTO workout_sessions (workout_plan_id, scheduled_at, started_at, completed_at)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id",
    )
    .bind(plan_id)
    .bind(times.scheduled_at)
    .bind(times.started_at)
    .bind(times.completed_at)
    .fetch_one(&mut *tx)
    .await?;

    for actual in actuals {
        check_session_actual(&mut tx, session_id, actual.workout_plan_exercise_id).await?;
        insert_actual(&mut tx, session_id, actual).await?;
    }

    tx.commit().await?;
    Ok(session_id)
}

/// Patch session timestamps (absent fields keep their value) and upsert
/// actuals, keyed by `workout_plan_exercise_id` within the session.
pub async fn update_session(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    session_id: i64,
    times: &SessionTimes,
    actuals: &[NewActual],
) -> Result<(), StoreError> {
    let mut tx = pool.begin().await?;

    let owned: Option<i64> = sqlx::query_scalar(
        "SELECT ws.id
         FROM workout_sessions ws
         JOIN workout_plans wp ON ws.workout_plan_id = wp.id
         WHERE ws.id = ?1 AND ws.workout_plan_id = ?2 AND wp.user_id = ?3",
    )
    .bind(session_id)
    .bind(plan_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    if owned.is_none() {
        return Err(StoreError::not_found(format!(
            "No workout session with id {session_id} for this user."
        )));
    }

    sqlx::query(
        "UPDATE workout_sessions
         SET scheduled_at = COALESCE(?1, scheduled_at),
             started_at = COALESCE(?2, started_at),
             completed_at = COALESCE(?3, completed_at)
         WHERE id = ?4",
    )
    .bind(times.scheduled_at)
    .bind(times.started_at)
    .bind(times.completed_at)
    .bind(session_id)
    .execute(&mut *tx)
    .await?;

    for actual in actuals {
        check_session_actual(&mut tx, session_id, actual.workout_plan_exercise_id).await?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM session_exercises
             WHERE workout_session_id = ?1 AND workout_plan_exercise_id = ?2",
        )
        .bind(session_id)
        .bind(actual.workout_plan_exercise_id)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(row_id) => {
                sqlx::query(
                    "UPDATE session_exercises
                     SET actual_sets = ?1, actual_reps = ?2, actual_weight = ?3, notes = ?4
                     WHERE id = ?5",
                )
                .bind(actual.actual_sets)
                .bind(actual.actual_reps)
                .bind(actual.actual_weight)
                .bind(&actual.notes)
                .bind(row_id)
                .execute(&mut *tx)
                .await?;
            }
            None => insert_actual(&mut tx, session_id, actual).await?,
        }
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_session(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
    session_id: i64,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "DELETE FROM workout_sessions
         WHERE id = ?1 AND workout_plan_id = ?2
           AND workout_plan_id IN (SELECT id FROM workout_plans WHERE user_id = ?3)",
    )
    .bind(session_id)
    .bind(plan_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::not_found(format!(
            "No workout session with id {session_id} for this user."
        )));
    }
    Ok(())
}

pub async fn session_actuals(
    pool: &SqlitePool,
    session_id: i64,
) -> Result<Vec<SessionExercise>, StoreError> {
    sqlx::query_as::<_, SessionExercise>(
        "SELECT id, workout_session_id, workout_plan_exercise_id,
                actual_sets, actual_reps, actual_weight, notes
         FROM session_exercises
         WHERE workout_session_id = ?1
         ORDER BY id",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

// Reports

/// Assemble the aggregate report for a plan the user owns: targets with
/// exercise names, plus every session with its actuals.
pub async fn plan_report(
    pool: &SqlitePool,
    user_id: i64,
    plan_id: i64,
) -> Result<Option<PlanReport>, StoreError> {
    let Some(plan) = get_plan(pool, user_id, plan_id).await? else {
        return Ok(None);
    };

    let exercises = plan_targets(pool, plan_id).await?;

    let sessions = sqlx::query_as::<_, WorkoutSession>(
        "SELECT id, workout_plan_id, scheduled_at, started_at, completed_at
         FROM workout_sessions
         WHERE workout_plan_id = ?1
         ORDER BY id",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    let actuals = sqlx::query_as::<_, ActualDetail>(
        "SELECT se.id, se.workout_session_id, se.workout_plan_exercise_id,
                e.name AS exercise_name,
                se.actual_sets, se.actual_reps, se.actual_weight, se.notes
         FROM session_exercises se
         JOIN workout_sessions ws ON se.workout_session_id = ws.id
         JOIN workout_plan_exercises wpe ON se.workout_plan_exercise_id = wpe.id
         JOIN exercises e ON wpe.exercise_id = e.id
         WHERE ws.workout_plan_id = ?1
         ORDER BY se.id",
    )
    .bind(plan_id)
    .fetch_all(pool)
    .await?;

    let sessions = sessions
        .into_iter()
        .map(|s| SessionReport {
            id: s.id,
            scheduled_at: s.scheduled_at,
            started_at: s.started_at,
            completed_at: s.completed_at,
            exercises: actuals
                .iter()
                .filter(|a| a.workout_session_id == s.id)
                .cloned()
                .collect(),
        })
        .collect();

    Ok(Some(PlanReport {
        id: plan.id,
        name: plan.name,
        exercises,
        sessions,
    }))
}

// Helpers

async fn ensure_exercise_exists(
    tx: &mut sqlx::SqliteConnection,
    exercise_id: i64,
) -> Result<(), StoreError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM exercises WHERE id = ?1")
        .bind(exercise_id)
        .fetch_optional(&mut *tx)
        .await?;
    if found.is_none() {
        return Err(StoreError::invalid_reference(format!(
            "Exercise with id {exercise_id} does not exist."
        )));
    }
    Ok(())
}

async fn insert_actual(
    tx: &mut sqlx::SqliteConnection,
    session_id: i64,
    actual: &NewActual,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO session_exercises
             (workout_session_id, workout_plan_exercise_id,
              actual_sets, actual_reps, actual_weight, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(session_id)
    .bind(actual.workout_plan_exercise_id)
    .bind(actual.actual_sets)
    .bind(actual.actual_reps)
    .bind(actual.actual_weight)
    .bind(&actual.notes)
    .execute(&mut *tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::seed_exercises;
    use crate::db::test_pool;

    async fn seeded_pool() -> SqlitePool {
        let pool = test_pool().await;
        seed_exercises(&pool).await.unwrap();
        pool
    }

    async fn make_user(pool: &SqlitePool, email: &str) -> User {
        create_user(
            pool,
            &NewUser {
                name: "Test".into(),
                surname: "User".into(),
                email: email.into(),
                password_hash: "hash".into(),
            },
        )
        .await
        .unwrap()
    }

    fn target(exercise_id: i64, sets: i64, reps: i64, weight: f64) -> NewTarget {
        NewTarget {
            exercise_id,
            target_sets: sets,
            target_reps: reps,
            target_weight: weight,
        }
    }

    fn actual(workout_plan_exercise_id: i64, sets: i64, reps: i64) -> NewActual {
        NewActual {
            workout_plan_exercise_id,
            actual_sets: sets,
            actual_reps: reps,
            actual_weight: 1.0,
            notes: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = seeded_pool().await;
        make_user(&pool, "a@x.com").await;
        let err = create_user(
            &pool,
            &NewUser {
                name: "Other".into(),
                surname: "User".into(),
                email: "a@x.com".into(),
                password_hash: "hash2".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
    }

    #[tokio::test]
    async fn plans_list_newest_first() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let first = create_plan(&pool, user.id, "Push Day", &[]).await.unwrap();
        let second = create_plan(&pool, user.id, "Pull Day", &[]).await.unwrap();
        let plans = list_plans(&pool, user.id).await.unwrap();
        assert_eq!(plans.iter().map(|p| p.id).collect::<Vec<_>>(), vec![second, first]);
    }

    #[tokio::test]
    async fn create_plan_round_trips_targets() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_id = create_plan(
            &pool,
            user.id,
            "Full Body",
            &[target(1, 3, 12, 0.0), target(2, 4, 10, 20.0)],
        )
        .await
        .unwrap();

        let targets = plan_targets(&pool, plan_id).await.unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].exercise_id, 1);
        assert_eq!(targets[0].target_sets, 3);
        assert_eq!(targets[0].target_reps, 12);
        assert_eq!(targets[1].exercise_id, 2);
        assert_eq!(targets[1].target_weight, 20.0);
    }

    #[tokio::test]
    async fn create_plan_with_unknown_exercise_rolls_back() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let err = create_plan(&pool, user.id, "Ghost", &[target(999, 3, 12, 0.0)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidReference(_)));
        // The plan row itself must not survive the rollback.
        assert!(list_plans(&pool, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_plan_upserts_targets_by_exercise() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_id = create_plan(&pool, user.id, "Legs", &[target(2, 3, 10, 40.0)])
            .await
            .unwrap();

        update_plan(
            &pool,
            user.id,
            plan_id,
            Some("Leg Day"),
            &[target(2, 5, 5, 60.0), target(4, 3, 8, 80.0)],
        )
        .await
        .unwrap();

        let plan = get_plan(&pool, user.id, plan_id).await.unwrap().unwrap();
        assert_eq!(plan.name, "Leg Day");
        assert!(plan.updated_at.is_some());

        let targets = plan_targets(&pool, plan_id).await.unwrap();
        assert_eq!(targets.len(), 2);
        let squat = targets.iter().find(|t| t.exercise_id == 2).unwrap();
        assert_eq!((squat.target_sets, squat.target_reps), (5, 5));
        assert_eq!(squat.target_weight, 60.0);
    }

    #[tokio::test]
    async fn plans_are_scoped_to_their_owner() {
        let pool = seeded_pool().await;
        let owner = make_user(&pool, "a@x.com").await;
        let other = make_user(&pool, "b@x.com").await;
        let plan_id = create_plan(&pool, owner.id, "Mine", &[]).await.unwrap();

        assert!(get_plan(&pool, other.id, plan_id).await.unwrap().is_none());
        assert!(matches!(
            delete_plan(&pool, other.id, plan_id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        // Still there for the owner.
        assert!(get_plan(&pool, owner.id, plan_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_plan_cascades_to_sessions_and_actuals() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_id = create_plan(&pool, user.id, "Full Body", &[target(1, 3, 12, 0.0)])
            .await
            .unwrap();
        let wpe_id = plan_targets(&pool, plan_id).await.unwrap()[0].workout_plan_exercise_id;
        create_session(
            &pool,
            user.id,
            plan_id,
            &SessionTimes::default(),
            &[actual(wpe_id, 3, 12)],
        )
        .await
        .unwrap();

        delete_plan(&pool, user.id, plan_id).await.unwrap();

        for table in ["workout_plan_exercises", "workout_sessions", "session_exercises"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "{table} not emptied by cascade");
        }
    }

    #[tokio::test]
    async fn cross_plan_actual_is_rejected_and_nothing_written() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_a = create_plan(&pool, user.id, "A", &[target(1, 3, 12, 0.0)])
            .await
            .unwrap();
        let plan_b = create_plan(&pool, user.id, "B", &[target(2, 3, 12, 0.0)])
            .await
            .unwrap();
        let b_target = plan_targets(&pool, plan_b).await.unwrap()[0].workout_plan_exercise_id;

        let err = create_session(
            &pool,
            user.id,
            plan_a,
            &SessionTimes::default(),
            &[actual(b_target, 3, 12)],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::CrossPlanMismatch));

        // Whole transaction rolled back: no session, no actual.
        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        let actuals: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM session_exercises")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((sessions, actuals), (0, 0));
    }

    #[tokio::test]
    async fn dangling_target_reference_is_invalid() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_id = create_plan(&pool, user.id, "A", &[]).await.unwrap();

        let err = create_session(
            &pool,
            user.id,
            plan_id,
            &SessionTimes::default(),
            &[actual(12345, 1, 1)],
        )
        .await
        .unwrap_err();
        match err {
            StoreError::InvalidReference(msg) => assert_eq!(msg, "Invalid workout exercise."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_session_upserts_actuals_and_patches_times() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_id = create_plan(&pool, user.id, "A", &[target(1, 3, 12, 0.0)])
            .await
            .unwrap();
        let wpe_id = plan_targets(&pool, plan_id).await.unwrap()[0].workout_plan_exercise_id;

        let started = crate::validate::parse_datetime("2025-04-13 10:00:00").unwrap();
        let session_id = create_session(
            &pool,
            user.id,
            plan_id,
            &SessionTimes {
                started_at: Some(started),
                ..Default::default()
            },
            &[actual(wpe_id, 2, 10)],
        )
        .await
        .unwrap();

        let completed = crate::validate::parse_datetime("2025-04-13 11:00:00").unwrap();
        update_session(
            &pool,
            user.id,
            plan_id,
            session_id,
            &SessionTimes {
                completed_at: Some(completed),
                ..Default::default()
            },
            &[NewActual {
                workout_plan_exercise_id: wpe_id,
                actual_sets: 3,
                actual_reps: 12,
                actual_weight: 5.0,
                notes: Some("Felt strong".into()),
            }],
        )
        .await
        .unwrap();

        let session = get_session(&pool, user.id, plan_id, session_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.started_at, Some(started));
        assert_eq!(session.completed_at, Some(completed));

        let actuals = session_actuals(&pool, session_id).await.unwrap();
        assert_eq!(actuals.len(), 1, "update must not duplicate the actual");
        assert_eq!(actuals[0].actual_sets, 3);
        assert_eq!(actuals[0].notes.as_deref(), Some("Felt strong"));
    }

    #[tokio::test]
    async fn report_covers_targets_sessions_and_actuals() {
        let pool = seeded_pool().await;
        let user = make_user(&pool, "a@x.com").await;
        let plan_id = create_plan(&pool, user.id, "Full Body", &[target(1, 3, 12, 0.0)])
            .await
            .unwrap();
        let wpe_id = plan_targets(&pool, plan_id).await.unwrap()[0].workout_plan_exercise_id;
        create_session(
            &pool,
            user.id,
            plan_id,
            &SessionTimes::default(),
            &[actual(wpe_id, 3, 12)],
        )
        .await
        .unwrap();

        let report = plan_report(&pool, user.id, plan_id).await.unwrap().unwrap();
        assert_eq!(report.name, "Full Body");
        assert_eq!(report.exercises.len(), 1);
        assert_eq!(report.sessions.len(), 1);
        let recorded = &report.sessions[0].exercises;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].exercise_name, "Push-up");
        assert_eq!((recorded[0].actual_sets, recorded[0].actual_reps), (3, 12));

        // Another user never sees it.
        let other = make_user(&pool, "b@x.com").await;
        assert!(plan_report(&pool, other.id, plan_id).await.unwrap().is_none());
    }
}
