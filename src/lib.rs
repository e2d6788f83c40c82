//! Tasklane - multi-user task tracking backend
//!
//! Authenticated users create, list, read, update and delete their own
//! tasks over a REST API. Reads go through a TTL cache in front of the
//! store; writes go to the store and invalidate every affected cache entry.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Service Layer** (`services`): task access coordination and authentication
//! - **Adapters** (`adapters`): SQLite store, moka/Redis caches, axum HTTP surface
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): `serve` and `migrate` commands

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, NewTask, Task, TaskPatch, TaskStatus, User, UserProfile};
pub use domain::ports::{CacheStore, TaskRepository, UserRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AuthService, TaskAccessCoordinator};
