//! Task domain model.
//!
//! Tasks are personal records owned by exactly one user. Only the owner
//! may read or mutate them; every store query is filtered by owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Progress state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Done
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in-progress" | "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Pending, Self::InProgress, Self::Completed]
    }
}

/// A task record as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Materialize a new record for `owner_id` with a fresh id and timestamps.
    pub fn new(owner_id: Uuid, fields: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: fields.title,
            description: fields.description,
            status: fields.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner_id: Uuid) -> bool {
        self.owner_id == owner_id
    }
}

/// Fields supplied by a caller when creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Reject blank titles and descriptions.
    pub fn validate(&self) -> DomainResult<()> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)
    }
}

/// Partial update of a task; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }

    /// A patch must change at least one field and must not blank any text field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::ValidationFailed(
                "at least one of title, description or status is required".to_string(),
            ));
        }
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description)?;
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::ValidationFailed(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::InProgress).unwrap(), "\"in-progress\"");
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"completed\"").unwrap(),
            TaskStatus::Completed
        );
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        for status in TaskStatus::all() {
            assert_eq!(TaskStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::from_str("IN_PROGRESS"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_str("archived"), None);
    }

    #[test]
    fn test_new_task_defaults_to_pending() {
        let owner = Uuid::new_v4();
        let task = Task::new(owner, NewTask::new("Write report", "Quarterly numbers"));

        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.is_owned_by(owner));
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_json_uses_camel_case() {
        let task = Task::new(Uuid::new_v4(), NewTask::new("A", "B"));
        let json = serde_json::to_value(&task).unwrap();

        assert!(json.get("ownerId").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("owner_id").is_none());
    }

    #[test]
    fn test_new_task_validation() {
        assert!(NewTask::new("A", "B").validate().is_ok());
        assert!(matches!(
            NewTask::new("  ", "B").validate(),
            Err(DomainError::ValidationFailed(_))
        ));
        assert!(NewTask::new("A", "").validate().is_err());
    }

    #[test]
    fn test_patch_validation() {
        assert!(TaskPatch::default().validate().is_err());
        assert!(TaskPatch::status(TaskStatus::Completed).validate().is_ok());

        let blank_title = TaskPatch {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(blank_title.validate().is_err());
    }
}
