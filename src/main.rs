//! Tasklane CLI entry point.

use clap::Parser;

use tasklane::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => tasklane::cli::commands::serve::execute(args).await,
        Commands::Migrate(args) => tasklane::cli::commands::migrate::execute(args).await,
    };

    if let Err(err) = result {
        tasklane::cli::handle_error(err);
    }
}
