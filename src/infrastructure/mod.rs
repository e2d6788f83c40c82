//! Infrastructure layer module
//!
//! Process-level concerns shared by the binary and the adapters:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;
