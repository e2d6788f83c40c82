use crate::domain::errors::DomainResult;
use crate::domain::models::{NewTask, Task, TaskPatch};
use async_trait::async_trait;
use uuid::Uuid;

/// Repository port for task persistence operations.
///
/// Every lookup and mutation is filtered by owner, so per-user isolation
/// holds at the data layer and not only at the API layer.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks of an owner, in insertion order
    async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Task>>;

    /// A single task matching both id and owner
    async fn find_one(&self, task_id: Uuid, owner_id: Uuid) -> DomainResult<Option<Task>>;

    /// Insert a new task; the store assigns id and timestamps
    async fn insert(&self, owner_id: Uuid, fields: NewTask) -> DomainResult<Task>;

    /// Apply a partial update and refresh `updated_at`; `None` when nothing matched
    async fn update_one(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
    ) -> DomainResult<Option<Task>>;

    /// Remove a task; `false` when nothing matched
    async fn delete_one(&self, task_id: Uuid, owner_id: Uuid) -> DomainResult<bool>;
}
