//! REST adapter (axum).

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use extract::AuthenticatedOwner;
pub use server::{router, AppState, HttpServer, HttpServerConfig};
