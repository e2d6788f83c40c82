//! Common test utilities for integration tests
//!
//! Builds coordinators and routers over an in-memory SQLite database and
//! an in-process moka cache.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tasklane::adapters::cache::MokaCacheStore;
use tasklane::adapters::http::router;
use tasklane::adapters::sqlite::{create_migrated_test_pool, SqliteTaskRepository};
use tasklane::cli::commands::serve::build_state;
use tasklane::domain::errors::{DomainError, DomainResult};
use tasklane::domain::models::Config;
use tasklane::domain::ports::CacheStore;
use tasklane::services::TaskAccessCoordinator;

pub type TestCoordinator = TaskAccessCoordinator<SqliteTaskRepository, MokaCacheStore>;

/// Setup test logging
///
/// Initializes a tracing subscriber writing to the test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Coordinator plus direct handles on its store and cache.
pub struct Fixture {
    pub coordinator: TestCoordinator,
    pub store: Arc<SqliteTaskRepository>,
    pub cache: Arc<MokaCacheStore>,
}

pub async fn fixture_with_ttl(ttl: Duration) -> Fixture {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    let store = Arc::new(SqliteTaskRepository::new(pool));
    let cache = Arc::new(MokaCacheStore::new());
    let coordinator = TaskAccessCoordinator::with_ttl(store.clone(), cache.clone(), ttl);
    Fixture { coordinator, store, cache }
}

pub async fn fixture() -> Fixture {
    fixture_with_ttl(Duration::from_secs(300)).await
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Full application router over fresh in-memory backends.
pub async fn test_app() -> Router {
    test_app_with_cache(Arc::new(MokaCacheStore::new())).await
}

/// Full application router over a fresh database and the given cache.
pub async fn test_app_with_cache(cache: Arc<dyn CacheStore>) -> Router {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    let state = build_state(pool, cache, &test_config());
    router(Arc::new(state), false)
}

/// Moka cache whose set reads always fail, as a Redis outage mid-request would.
#[derive(Default)]
pub struct SetReadFailingCache {
    inner: MokaCacheStore,
}

#[async_trait]
impl CacheStore for SetReadFailingCache {
    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()> {
        self.inner.set_with_expiry(key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> DomainResult<()> {
        self.inner.delete(keys).await
    }

    async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> DomainResult<()> {
        self.inner.add_to_set(key, member, ttl).await
    }

    async fn set_members(&self, _key: &str) -> DomainResult<Vec<String>> {
        Err(DomainError::CacheError("connection reset by peer".to_string()))
    }
}

/// Send one request and decode the JSON response body (`Value::Null` when empty or not JSON).
pub async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Register `email` and return a bearer token for it.
pub async fn register_and_login(app: &Router, email: &str) -> String {
    let credentials = serde_json::json!({ "email": email, "password": "secret123" });

    let (status, _) = send(app, Method::POST, "/api/auth/register", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/api/auth/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("login returns a token").to_string()
}
