use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

pub async fn init_database(config: &DatabaseConfig) -> Result<MySqlPool> {
    info!("Initializing database connection pool");

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(&config.url)
        .await
        .context("Failed to connect to database")?;

    // 测试连接
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to execute test query")?;

    info!("Database connection pool initialized successfully");

    Ok(pool)
}
