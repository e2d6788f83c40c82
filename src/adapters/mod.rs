//! Adapters connecting the domain ports to concrete technology:
//! SQLite persistence, moka/Redis caches and the axum REST surface.

pub mod cache;
pub mod http;
pub mod sqlite;
