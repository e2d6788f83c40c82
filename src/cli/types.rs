//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};

use super::commands::migrate::MigrateArgs;
use super::commands::serve::ServeArgs;

#[derive(Parser, Debug)]
#[command(name = "tasklane")]
#[command(about = "Tasklane - multi-user task tracking backend", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),

    /// Apply pending database migrations and exit
    Migrate(MigrateArgs),
}
