//! Tasklane HTTP server.
//!
//! Routes the REST surface onto the auth service and the task access
//! coordinator. Every task route requires a bearer token.

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::domain::models::ServerConfig;
use crate::domain::ports::{CacheStore, TaskRepository, UserRepository};
use crate::services::{AuthService, TaskAccessCoordinator};

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable permissive CORS.
    pub enable_cors: bool,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for HttpServerConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// Shared state for request handlers.
pub struct AppState {
    pub tasks: TaskAccessCoordinator<dyn TaskRepository, dyn CacheStore>,
    pub auth: AuthService<dyn UserRepository>,
}

impl AppState {
    pub fn new(
        tasks: TaskAccessCoordinator<dyn TaskRepository, dyn CacheStore>,
        auth: AuthService<dyn UserRepository>,
    ) -> Self {
        Self { tasks, auth }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/api/clear-cache", post(handlers::clear_cache))
        .route("/health", get(handlers::health_check))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(state: Arc<AppState>, config: HttpServerConfig) -> Self {
        Self { config, state }
    }

    fn build_router(&self) -> Router {
        router(self.state.clone(), self.config.enable_cors)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "Tasklane HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Tasklane HTTP server stopped");
        Ok(())
    }
}
