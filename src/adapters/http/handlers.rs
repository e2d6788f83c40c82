//! Route handlers.
//!
//! Handlers validate input, resolve the owner from the bearer token and
//! delegate to the auth service or the task access coordinator.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use std::sync::Arc;
use uuid::Uuid;

use super::dto::{
    CreateTaskRequest, CredentialsRequest, LoginResponse, MessageResponse, RegisterResponse,
    UpdateTaskRequest,
};
use super::error::ApiError;
use super::extract::AuthenticatedOwner;
use super::server::AppState;
use crate::domain::models::{NewTask, Task, TaskPatch};

type ApiResult<T> = Result<T, ApiError>;

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let user = state.auth.register(&req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let token = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list_tasks(owner_id).await?))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(req) = payload?;
    let fields = NewTask::from(req);
    fields.validate()?;

    let task = state.tasks.create_task(owner_id, fields).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    Ok(Json(state.tasks.get_task(owner_id, task_id).await?))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;
    let Json(req) = payload?;
    let patch = TaskPatch::from(req);
    patch.validate()?;

    Ok(Json(state.tasks.update_task(owner_id, task_id, patch).await?))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let task_id = parse_task_id(&id)?;
    state.tasks.delete_task(owner_id, task_id).await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    AuthenticatedOwner(owner_id): AuthenticatedOwner,
) -> ApiResult<Json<MessageResponse>> {
    state.tasks.clear_cache(owner_id).await?;
    Ok(Json(MessageResponse::new("Cache cleared successfully")))
}

/// An id that is not a UUID cannot name any task.
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::task_not_found())
}
