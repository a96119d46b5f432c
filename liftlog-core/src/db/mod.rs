pub mod consistency;
pub mod models;
pub mod operations;
pub mod seed;

use std::str::FromStr;

use log::{debug, info};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::StoreError;

/// Open a pooled connection to the backing store.
///
/// Foreign keys are enabled on every connection so the `ON DELETE CASCADE`
/// constraints in the schema actually fire under SQLite.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    Ok(pool)
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2025_08_30_000000_0000_SETUP_TABLES: &str =
    include_str!("../../../migrations/2025-08-30-000000-0000_setup_tables/up.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2025-08-30-000000-0000_setup_tables",
    up_sql: MIGRATION_2025_08_30_000000_0000_SETUP_TABLES,
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool, StoreError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

async fn mark_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
        .bind(migration_name)
        .execute(pool)
        .await?;
    Ok(())
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Apply any pending embedded migrations, tracked in `_migrations`.
pub async fn init_database(pool: &SqlitePool) -> Result<(), StoreError> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        for statement in parse_sql_statements(migration.up_sql) {
            sqlx::query(&statement).execute(pool).await?;
        }

        mark_migration_applied(pool, migration.name).await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // A shared in-memory database needs a single connection to stay alive.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    init_database(&pool).await.unwrap();
    pool
}
