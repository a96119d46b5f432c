pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;

/// Shared handler state: the connection pool and server configuration.
/// Handlers hold no other mutable state; every request's store work runs
/// in its own transaction.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
}
