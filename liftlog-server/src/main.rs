use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use log::info;

use liftlog_server::config::Config;
use liftlog_server::{AppState, routes};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;

    let pool = liftlog::db::connect(&config.database_url).await?;
    liftlog::db::init_database(&pool).await?;
    liftlog::db::seed::seed_exercises(&pool).await?;

    let state = AppState {
        pool,
        config: Arc::new(config),
    };
    let bind_addr = state.config.bind_addr.clone();
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
