//! CLI command implementations.

pub mod migrate;
pub mod serve;

use anyhow::Result;
use std::path::Path;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from `path` when given, else from the project layout.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Load configuration for `migrate`, which needs no auth or cache settings.
pub fn load_migration_config(path: Option<&Path>) -> Result<Config> {
    ConfigLoader::load_for_migrations(path)
}
