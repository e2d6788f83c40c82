//! Implementation of the `tasklane migrate` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::adapters::sqlite::{all_embedded_migrations, create_pool, Migrator, PoolConfig};
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Configuration file (defaults to .tasklane/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: MigrateArgs) -> Result<()> {
    let config = super::load_migration_config(args.config.as_deref())?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    let pool = create_pool(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to open database")?;

    let migrator = Migrator::new(pool.clone());
    let applied = migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to apply migrations")?;
    let version = migrator.get_current_version().await?;
    pool.close().await;

    println!("Applied {applied} migration(s); schema version is now {version}");
    Ok(())
}
