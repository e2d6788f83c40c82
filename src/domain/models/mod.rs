//! Domain models for the Tasklane backend.

pub mod config;
pub mod task;
pub mod user;

pub use config::{
    AuthConfig, CacheBackend, CacheConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig,
};
pub use task::{NewTask, Task, TaskPatch, TaskStatus};
pub use user::{User, UserProfile};
