use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{CacheBackend, Config};

/// Prefix for environment overrides, e.g. `TASKLANE_SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "TASKLANE_";

const PROJECT_CONFIG: &str = ".tasklane/config.yaml";
const LOCAL_CONFIG: &str = ".tasklane/local.yaml";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const VALID_ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port: {0}. Must be non-zero")]
    InvalidPort(u16),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid cache ttl_secs: {0}. Must be at least 1")]
    InvalidCacheTtl(u64),

    #[error("Invalid cache max_capacity: {0}. Must be at least 1")]
    InvalidCacheCapacity(u64),

    #[error("cache.redis_url is required when cache.backend is redis")]
    MissingRedisUrl,

    #[error("auth.jwt_secret cannot be empty")]
    EmptyJwtSecret,

    #[error("Invalid token_ttl_secs: {0}. Must be at least 1")]
    InvalidTokenTtl(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

type Validator = fn(&Config) -> Result<(), ConfigError>;

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .tasklane/config.yaml
    /// 3. .tasklane/local.yaml (optional local overrides)
    /// 4. Environment variables (TASKLANE_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::extract(&Self::project_figment(), Self::validate)
            .context("Failed to extract configuration from figment")
    }

    /// Load defaults, then `path`, then environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        Self::load_layered(path.as_ref(), ENV_PREFIX, Self::validate)
    }

    /// Load configuration for commands that only touch the database.
    ///
    /// Only the database and logging sections are validated, so `migrate`
    /// runs without an `auth.jwt_secret`.
    pub fn load_for_migrations(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_layered(path, ENV_PREFIX, Self::validate_storage),
            None => Self::extract(&Self::project_figment(), Self::validate_storage)
                .context("Failed to extract configuration from figment"),
        }
    }

    fn project_figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG))
            .merge(Yaml::file(LOCAL_CONFIG))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn load_layered(path: &Path, env_prefix: &str, validate: Validator) -> Result<Config> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(env_prefix).split("__"));

        Self::extract(&figment, validate).with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn extract(figment: &Figment, validate: Validator) -> Result<Config> {
        let config: Config = figment.extract()?;
        validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }

        if config.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidCacheTtl(config.cache.ttl_secs));
        }
        if config.cache.max_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity(config.cache.max_capacity));
        }
        if config.cache.backend == CacheBackend::Redis
            && config.cache.redis_url.as_deref().is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::MissingRedisUrl);
        }

        if config.auth.jwt_secret.is_empty() {
            return Err(ConfigError::EmptyJwtSecret);
        }
        if config.auth.token_ttl_secs == 0 {
            return Err(ConfigError::InvalidTokenTtl(config.auth.token_ttl_secs));
        }

        Self::validate_storage(config)
    }

    /// Validate the database and logging sections only
    pub fn validate_storage(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        if !VALID_LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !VALID_LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !VALID_ROTATIONS.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
