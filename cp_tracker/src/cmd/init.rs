use crate::cmd::open_database;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {}

pub async fn run(_args: InitArgs) -> Result<()> {
    let pool = open_database().await?;
    pool.close().await;
    tracing::info!("Database initialized!");

    Ok(())
}
