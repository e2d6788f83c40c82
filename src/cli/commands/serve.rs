//! Implementation of the `tasklane serve` command.

use anyhow::{Context, Result};
use clap::Args;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::cache::build_cache_store;
use crate::adapters::http::{AppState, HttpServer, HttpServerConfig};
use crate::adapters::sqlite::{
    initialize_database, verify_connection, PoolConfig, SqliteTaskRepository, SqliteUserRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{CacheStore, TaskRepository, UserRepository};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::services::{AuthService, TaskAccessCoordinator};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Configuration file (defaults to .tasklane/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Wire the services onto one database pool and one cache store.
pub fn build_state(pool: SqlitePool, cache: Arc<dyn CacheStore>, config: &Config) -> AppState {
    let task_repo: Arc<dyn TaskRepository> = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let tasks = TaskAccessCoordinator::with_ttl(
        task_repo,
        cache,
        Duration::from_secs(config.cache.ttl_secs),
    );
    let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(pool));
    let auth = AuthService::new(user_repo, &config.auth);
    AppState::new(tasks, auth)
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    ConfigLoader::validate(&config)?;

    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    let pool = initialize_database(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database")?;
    verify_connection(&pool).await.context("Database is not reachable")?;
    let cache = build_cache_store(&config.cache).context("Failed to build cache store")?;
    tracing::info!(backend = ?config.cache.backend, ttl_secs = config.cache.ttl_secs, "cache store ready");

    let state = Arc::new(build_state(pool.clone(), cache, &config));
    let server = HttpServer::new(state, HttpServerConfig::from(&config.server));

    let result = server.serve_with_shutdown(shutdown_signal()).await;
    pool.close().await;
    result.map_err(|e| anyhow::anyhow!(e)).context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("shutdown signal received");
}
