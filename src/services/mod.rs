pub mod auth_service;
pub mod cache_keys;
pub mod task_access;

pub use auth_service::{AuthService, Claims};
pub use task_access::{TaskAccessCoordinator, DEFAULT_CACHE_TTL};
