//! Command-line interface.

pub mod commands;
pub mod types;

pub use types::{Cli, Commands};

/// Print a command failure with its cause chain and exit non-zero.
pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("Error: {err:#}");
    std::process::exit(1)
}
