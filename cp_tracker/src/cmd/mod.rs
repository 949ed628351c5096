pub mod init;
pub mod server;

use crate::modules::database::{self, MIGRATOR};
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::env;

/// Opens the store named by `DATABASE_URL` and brings its schema up to date.
pub async fn open_database() -> Result<Pool<Sqlite>> {
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
        tracing::warn!("DATABASE_URL environment variable is not set. Default value `sqlite://cp_tracker.db` will be used.");
        String::from("sqlite://cp_tracker.db")
    });

    let pool = database::connect(&database_url).await.with_context(|| {
        let message = format!("Failed to open database {}.", database_url);
        tracing::error!(message);
        message
    })?;

    MIGRATOR.run(&pool).await.with_context(|| {
        let message = "Failed to run database migrations.";
        tracing::error!(message);
        message
    })?;

    Ok(pool)
}
