use log::info;
use sqlx::SqlitePool;

use crate::db::models::NewExercise;
use crate::db::operations::create_exercise;
use crate::error::StoreError;

const DEFAULT_EXERCISES: &[(&str, &str, &str)] = &[
    ("Push-up", "Bodyweight", "Triceps"),
    ("Squat", "Bodyweight", "Glutes"),
    ("Bench Press", "Strength", "Pectoralis major"),
    ("Deadlift", "Strength", "Hamstrings"),
    ("Pull-up", "Bodyweight", "Latissimus dorsi"),
    ("Overhead Press", "Strength", "Deltoids"),
    ("Bicep Curl", "Strength", "Biceps"),
    ("Lunge", "Bodyweight", "Quadriceps"),
];

/// Populate the shared exercise catalog when it is empty. Idempotent:
/// a non-empty catalog is left untouched.
pub async fn seed_exercises(pool: &SqlitePool) -> Result<(), StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercises")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    for (name, category, muscle_group) in DEFAULT_EXERCISES {
        create_exercise(
            pool,
            &NewExercise {
                name: (*name).to_string(),
                description: Some(format!("{name} exercise")),
                category: Some((*category).to_string()),
                muscle_group: Some((*muscle_group).to_string()),
            },
        )
        .await?;
    }
    info!("Seeded {} catalog exercises", DEFAULT_EXERCISES.len());
    Ok(())
}
