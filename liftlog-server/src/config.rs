use std::env;

use anyhow::{Context, Result};

/// Server configuration, read once at startup from the environment
/// (a `.env` file is loaded in `main` before this runs).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub bind_addr: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be specified or present in the environment")?,
            secret_key: env::var("SECRET_KEY")
                .context("SECRET_KEY must be specified or present in the environment")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
