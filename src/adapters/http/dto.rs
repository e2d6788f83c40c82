//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::domain::models::{NewTask, TaskPatch, TaskStatus, UserProfile};

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
        }
    }
}

/// Body of `PUT /api/tasks/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
        }
    }
}

/// Body of the register and login endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        let body = r#"{"title":"a","description":"b","userId":"someone-else"}"#;
        assert!(serde_json::from_str::<CreateTaskRequest>(body).is_err());
    }

    #[test]
    fn test_create_request_rejects_unknown_status() {
        let body = r#"{"title":"a","description":"b","status":"archived"}"#;
        assert!(serde_json::from_str::<CreateTaskRequest>(body).is_err());
    }

    #[test]
    fn test_update_request_maps_to_patch() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"status":"in-progress"}"#).unwrap();
        let patch = TaskPatch::from(req);
        assert_eq!(patch, TaskPatch::status(TaskStatus::InProgress));
    }
}
