//! Cache key layout.
//!
//! - List cache: `tasks:{owner_id}` -> JSON array of the owner's tasks
//! - Item cache: `task:{owner_id}:{task_id}` -> JSON of one task
//! - Owner item index: `task-index:{owner_id}` -> set of item keys populated for the owner

use uuid::Uuid;

/// Prefix for per-owner task collections.
const LIST_KEY_PREFIX: &str = "tasks:";

/// Prefix for single-task snapshots.
const ITEM_KEY_PREFIX: &str = "task:";

/// Prefix for the per-owner set of item keys.
const INDEX_KEY_PREFIX: &str = "task-index:";

/// Key of the owner's cached task list.
pub fn list_key(owner_id: Uuid) -> String {
    format!("{LIST_KEY_PREFIX}{owner_id}")
}

/// Item keys are owner-scoped so one owner's snapshot is never served to another.
pub fn item_key(owner_id: Uuid, task_id: Uuid) -> String {
    format!("{ITEM_KEY_PREFIX}{owner_id}:{task_id}")
}

/// Common prefix of every item key belonging to `owner_id`.
pub fn item_key_prefix(owner_id: Uuid) -> String {
    format!("{ITEM_KEY_PREFIX}{owner_id}:")
}

/// Key of the set recording which item keys were populated for the owner.
pub fn index_key(owner_id: Uuid) -> String {
    format!("{INDEX_KEY_PREFIX}{owner_id}")
}
