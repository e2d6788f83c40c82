//! Task access coordinator: read-through cache, write-invalidate store.
//!
//! Reads consult the cache first and repopulate it from the store on a miss.
//! Writes mutate the store first and then delete every cache entry the
//! mutation affects; entries are never updated in place.
//!
//! Cache failures never decide the outcome of a read or a write. A failed
//! cache read is a miss. A failed invalidation is logged and counted, and
//! the write still succeeds; the stale entry then lives until its TTL.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NewTask, Task, TaskPatch};
use crate::domain::ports::{CacheStore, TaskRepository};
use crate::services::cache_keys;

/// TTL applied to list and item entries alike.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Outcome of deleting the cache keys affected by one write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct InvalidationReport {
    invalidated: Vec<String>,
    /// Keys whose delete failed, with the cache error
    failed: Vec<(String, String)>,
}

impl InvalidationReport {
    fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Coordinates every task read and write with the cache.
///
/// Both ports may be `dyn` trait objects.
pub struct TaskAccessCoordinator<T: TaskRepository + ?Sized, C: CacheStore + ?Sized> {
    store: Arc<T>,
    cache: Arc<C>,
    ttl: Duration,
    invalidation_failures: AtomicU64,
}

impl<T: TaskRepository + ?Sized, C: CacheStore + ?Sized> TaskAccessCoordinator<T, C> {
    /// Create a coordinator with [`DEFAULT_CACHE_TTL`].
    pub fn new(store: Arc<T>, cache: Arc<C>) -> Self {
        Self::with_ttl(store, cache, DEFAULT_CACHE_TTL)
    }

    /// Create a coordinator whose cache entries expire after `ttl`.
    pub fn with_ttl(store: Arc<T>, cache: Arc<C>, ttl: Duration) -> Self {
        Self {
            store,
            cache,
            ttl,
            invalidation_failures: AtomicU64::new(0),
        }
    }

    /// TTL applied to every entry this coordinator writes.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of cache deletes that failed after a successful write.
    pub fn invalidation_failures(&self) -> u64 {
        self.invalidation_failures.load(Ordering::Relaxed)
    }

    /// All of the owner's tasks, in store order.
    #[instrument(skip(self), fields(%owner_id))]
    pub async fn list_tasks(&self, owner_id: Uuid) -> DomainResult<Vec<Task>> {
        let key = cache_keys::list_key(owner_id);

        if let Some(tasks) = self.read_cached::<Vec<Task>>(&key).await {
            debug!(count = tasks.len(), "task list served from cache");
            return Ok(tasks);
        }

        let tasks = self.store.find_by_owner(owner_id).await?;
        self.populate(&key, &tasks).await;
        Ok(tasks)
    }

    /// One task of the owner, or `TaskNotFound`.
    #[instrument(skip(self), fields(%owner_id, %task_id))]
    pub async fn get_task(&self, owner_id: Uuid, task_id: Uuid) -> DomainResult<Task> {
        let key = cache_keys::item_key(owner_id, task_id);

        if let Some(task) = self.read_cached::<Task>(&key).await {
            if task.id == task_id && task.is_owned_by(owner_id) {
                debug!("task served from cache");
                return Ok(task);
            }
            warn!(key = %key, "cached task does not match its key, ignoring");
        }

        let task = self
            .store
            .find_one(task_id, owner_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        self.index_item_key(owner_id, &key).await;
        self.populate(&key, &task).await;
        Ok(task)
    }

    #[instrument(skip(self, new_task), fields(%owner_id))]
    pub async fn create_task(&self, owner_id: Uuid, new_task: NewTask) -> DomainResult<Task> {
        let task = self.store.insert(owner_id, new_task).await?;
        info!(task_id = %task.id, "task created");

        let report = self.invalidate(owner_id, vec![cache_keys::list_key(owner_id)]).await;
        debug!(invalidated = report.invalidated.len(), "cache invalidated after create");
        Ok(task)
    }

    #[instrument(skip(self, patch), fields(%owner_id, %task_id))]
    pub async fn update_task(&self, owner_id: Uuid, task_id: Uuid, patch: TaskPatch) -> DomainResult<Task> {
        let task = self
            .store
            .update_one(task_id, owner_id, patch)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;
        info!(status = task.status.as_str(), "task updated");

        let report = self.invalidate_task(owner_id, task_id).await;
        debug!(invalidated = report.invalidated.len(), "cache invalidated after update");
        Ok(task)
    }

    #[instrument(skip(self), fields(%owner_id, %task_id))]
    pub async fn delete_task(&self, owner_id: Uuid, task_id: Uuid) -> DomainResult<()> {
        if !self.store.delete_one(task_id, owner_id).await? {
            return Err(DomainError::TaskNotFound(task_id));
        }
        info!("task deleted");

        let report = self.invalidate_task(owner_id, task_id).await;
        debug!(invalidated = report.invalidated.len(), "cache invalidated after delete");
        Ok(())
    }

    /// Drop every cache entry belonging to the owner. Returns the number of keys deleted.
    ///
    /// The key set is the owner's list key, the owner's item index and its
    /// members, and an item key for every task the store holds for the
    /// owner. Other owners' entries are never touched.
    #[instrument(skip(self), fields(%owner_id))]
    pub async fn clear_cache(&self, owner_id: Uuid) -> DomainResult<usize> {
        let index_key = cache_keys::index_key(owner_id);
        let owner_prefix = cache_keys::item_key_prefix(owner_id);

        let mut keys = BTreeSet::new();
        keys.insert(cache_keys::list_key(owner_id));
        keys.extend(
            self.cache
                .set_members(&index_key)
                .await?
                .into_iter()
                .filter(|key| key.starts_with(&owner_prefix)),
        );
        for task in self.store.find_by_owner(owner_id).await? {
            keys.insert(cache_keys::item_key(owner_id, task.id));
        }
        keys.insert(index_key);

        let keys: Vec<String> = keys.into_iter().collect();
        self.cache.delete(&keys).await?;

        info!(keys = keys.len(), "owner cache cleared");
        Ok(keys.len())
    }

    async fn read_cached<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key, error = %e, "undecodable cache entry, treating as miss");
                    None
                }
            },
            Ok(None) => {
                debug!(key, "cache miss");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, falling back to store");
                None
            }
        }
    }

    async fn populate<V: Serialize + ?Sized>(&self, key: &str, value: &V) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "could not serialize value for cache");
                return;
            }
        };

        if let Err(e) = self.cache.set_with_expiry(key, &json, self.ttl).await {
            warn!(key, error = %e, "cache populate failed");
        }
    }

    async fn index_item_key(&self, owner_id: Uuid, item_key: &str) {
        let index_key = cache_keys::index_key(owner_id);
        if let Err(e) = self.cache.add_to_set(&index_key, item_key, self.ttl).await {
            warn!(key = %index_key, error = %e, "owner item index update failed");
        }
    }

    /// The list and item entries affected by a change to one task.
    async fn invalidate_task(&self, owner_id: Uuid, task_id: Uuid) -> InvalidationReport {
        let keys = vec![cache_keys::list_key(owner_id), cache_keys::item_key(owner_id, task_id)];
        self.invalidate(owner_id, keys).await
    }

    /// Delete each key on its own so one failure cannot mask the others.
    async fn invalidate(&self, owner_id: Uuid, keys: Vec<String>) -> InvalidationReport {
        let mut report = InvalidationReport::default();

        for key in keys {
            match self.cache.delete(std::slice::from_ref(&key)).await {
                Ok(()) => report.invalidated.push(key),
                Err(e) => {
                    self.invalidation_failures.fetch_add(1, Ordering::Relaxed);
                    error!(
                        %owner_id,
                        key = %key,
                        error = %e,
                        "cache invalidation failed, entry may be stale until TTL expiry"
                    );
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        if !report.is_complete() {
            error!(
                %owner_id,
                invalidated = report.invalidated.len(),
                failed = report.failed.len(),
                "write committed with incomplete cache invalidation"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MokaCacheStore;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteTaskRepository};
    use crate::domain::models::TaskStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex;

    /// Cache double whose operations can be made to fail on demand.
    #[derive(Default)]
    struct FlakyCache {
        inner: MokaCacheStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        fail_set_members: AtomicBool,
        fail_delete_of: Mutex<Option<String>>,
    }

    impl FlakyCache {
        fn fail_delete_of(&self, key: String) {
            *self.fail_delete_of.lock().unwrap() = Some(key);
        }
    }

    fn unavailable() -> DomainError {
        DomainError::CacheError("connection refused".to_string())
    }

    #[async_trait]
    impl CacheStore for FlakyCache {
        async fn get(&self, key: &str) -> DomainResult<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.get(key).await
        }

        async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> DomainResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.set_with_expiry(key, value, ttl).await
        }

        async fn delete(&self, keys: &[String]) -> DomainResult<()> {
            let failing = self.fail_delete_of.lock().unwrap().clone();
            if let Some(failing) = failing {
                if keys.contains(&failing) {
                    return Err(unavailable());
                }
            }
            self.inner.delete(keys).await
        }

        async fn add_to_set(&self, key: &str, member: &str, ttl: Duration) -> DomainResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.add_to_set(key, member, ttl).await
        }

        async fn set_members(&self, key: &str) -> DomainResult<Vec<String>> {
            if self.fail_set_members.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.inner.set_members(key).await
        }
    }

    /// Store double counting reads that reach the store.
    struct CountingStore {
        inner: SqliteTaskRepository,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl TaskRepository for CountingStore {
        async fn find_by_owner(&self, owner_id: Uuid) -> DomainResult<Vec<Task>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_owner(owner_id).await
        }

        async fn find_one(&self, task_id: Uuid, owner_id: Uuid) -> DomainResult<Option<Task>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.find_one(task_id, owner_id).await
        }

        async fn insert(&self, owner_id: Uuid, fields: NewTask) -> DomainResult<Task> {
            self.inner.insert(owner_id, fields).await
        }

        async fn update_one(&self, task_id: Uuid, owner_id: Uuid, patch: TaskPatch) -> DomainResult<Option<Task>> {
            self.inner.update_one(task_id, owner_id, patch).await
        }

        async fn delete_one(&self, task_id: Uuid, owner_id: Uuid) -> DomainResult<bool> {
            self.inner.delete_one(task_id, owner_id).await
        }
    }

    async fn setup() -> (TaskAccessCoordinator<CountingStore, FlakyCache>, Arc<CountingStore>, Arc<FlakyCache>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = Arc::new(CountingStore {
            inner: SqliteTaskRepository::new(pool),
            reads: AtomicUsize::new(0),
        });
        let cache = Arc::new(FlakyCache::default());
        let coordinator = TaskAccessCoordinator::new(store.clone(), cache.clone());
        (coordinator, store, cache)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let (coordinator, store, _cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();

        coordinator.list_tasks(owner).await.unwrap();
        coordinator.get_task(owner, task.id).await.unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);

        let listed = coordinator.list_tasks(owner).await.unwrap();
        let fetched = coordinator.get_task(owner, task.id).await.unwrap();
        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        assert_eq!(listed, vec![task.clone()]);
        assert_eq!(fetched, task);
    }

    #[tokio::test]
    async fn test_cache_read_failure_falls_through_to_store() {
        let (coordinator, store, cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();
        coordinator.list_tasks(owner).await.unwrap();

        cache.fail_reads.store(true, Ordering::SeqCst);
        let listed = coordinator.list_tasks(owner).await.unwrap();
        let fetched = coordinator.get_task(owner, task.id).await.unwrap();

        assert_eq!(listed, vec![task.clone()]);
        assert_eq!(fetched, task);
        assert_eq!(store.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cache_populate_failure_still_returns_store_result() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();

        cache.fail_writes.store(true, Ordering::SeqCst);
        assert_eq!(coordinator.get_task(owner, task.id).await.unwrap(), task);
        assert_eq!(coordinator.list_tasks(owner).await.unwrap(), vec![task.clone()]);

        let key = cache_keys::item_key(owner, task.id);
        assert_eq!(cache.inner.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();
        let key = cache_keys::list_key(owner);
        cache.inner.set_with_expiry(&key, "{not json", DEFAULT_CACHE_TTL).await.unwrap();

        assert_eq!(coordinator.list_tasks(owner).await.unwrap(), vec![task]);

        let repopulated = cache.inner.get(&key).await.unwrap().unwrap();
        assert!(serde_json::from_str::<Vec<Task>>(&repopulated).is_ok());
    }

    #[tokio::test]
    async fn test_partial_invalidation_failure_does_not_fail_write() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();
        coordinator.list_tasks(owner).await.unwrap();
        coordinator.get_task(owner, task.id).await.unwrap();

        cache.fail_delete_of(cache_keys::list_key(owner));
        let updated = coordinator
            .update_task(owner, task.id, TaskPatch::status(TaskStatus::Completed))
            .await
            .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(coordinator.invalidation_failures(), 1);
        assert!(cache.inner.get(&cache_keys::list_key(owner)).await.unwrap().is_some());

        // The item key was still deleted even though the list key failed.
        let item = cache_keys::item_key(owner, task.id);
        assert_eq!(cache.inner.get(&item).await.unwrap(), None);
        let fetched = coordinator.get_task(owner, task.id).await.unwrap();
        assert_eq!(fetched.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_invalidation_report_names_each_failed_key() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();
        let list = cache_keys::list_key(owner);
        let item = cache_keys::item_key(owner, task.id);

        cache.fail_delete_of(item.clone());
        let report = coordinator.invalidate_task(owner, task.id).await;

        assert!(!report.is_complete());
        assert_eq!(report.invalidated, vec![list]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, item);
        assert!(report.failed[0].1.contains("connection refused"));
        assert_eq!(coordinator.invalidation_failures(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_fails_when_index_is_unreadable() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        coordinator.list_tasks(owner).await.unwrap();

        cache.fail_set_members.store(true, Ordering::SeqCst);
        let result = coordinator.clear_cache(owner).await;

        assert!(matches!(result, Err(DomainError::CacheError(_))));
        assert!(result.unwrap_err().is_internal());
    }

    #[tokio::test]
    async fn test_clear_cache_fails_when_delete_fails() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        coordinator.list_tasks(owner).await.unwrap();

        cache.fail_delete_of(cache_keys::list_key(owner));

        assert!(matches!(coordinator.clear_cache(owner).await, Err(DomainError::CacheError(_))));
    }

    #[tokio::test]
    async fn test_not_found_write_leaves_cache_untouched() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();
        coordinator.list_tasks(owner).await.unwrap();

        let missing = Uuid::new_v4();
        let update = coordinator.update_task(owner, missing, TaskPatch::status(TaskStatus::Completed)).await;
        let delete = coordinator.delete_task(owner, missing).await;

        assert!(matches!(update, Err(DomainError::TaskNotFound(id)) if id == missing));
        assert!(matches!(delete, Err(DomainError::TaskNotFound(id)) if id == missing));
        assert!(cache.inner.get(&cache_keys::list_key(owner)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_get_task_records_item_key_in_owner_index() {
        let (coordinator, _store, cache) = setup().await;
        let owner = Uuid::new_v4();
        let task = coordinator.create_task(owner, NewTask::new("A", "B")).await.unwrap();

        coordinator.get_task(owner, task.id).await.unwrap();

        let members = cache.inner.set_members(&cache_keys::index_key(owner)).await.unwrap();
        assert_eq!(members, vec![cache_keys::item_key(owner, task.id)]);
    }

    #[test]
    fn test_invalidation_report_completeness() {
        let mut report = InvalidationReport::default();
        assert!(report.is_complete());
        report.failed.push(("tasks:x".to_string(), "down".to_string()));
        assert!(!report.is_complete());
    }
}
