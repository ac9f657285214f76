//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `sqlite`: SQLite database
//!
//! The store is the sole owner of the task normalization rules: title
//! trimming, priority coercion, and the status/completed reconciliation.
//! Backends only persist and retrieve; the rules live here so both
//! backends behave identically.

mod memory;
mod sqlite;

pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::config::Config;
use crate::task::{Lifecycle, Priority, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of tasks a single list call returns.
pub const MAX_LISTED_TASKS: usize = 100;

/// Typed store failures, mapped to response codes by the API layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-supplied data fails a content rule. Never fatal, never retried.
    #[error("{0}")]
    Validation(String),

    /// The target task does not exist, or the id is not a valid identifier.
    #[error("{0}")]
    NotFound(String),

    /// The backing store is unreachable or returned an unexpected error.
    #[error("task store error: {0}")]
    Storage(String),
}

/// Fields accepted when creating a task. Missing fields mean "absent",
/// not their zero value.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

impl NewTask {
    /// Normalize into a full task: trimmed title (required non-empty),
    /// defaulted description and priority, lifecycle resolved from whatever
    /// subset of status/completed was supplied. Both timestamps are set to
    /// the same instant.
    pub(crate) fn into_task(self) -> Result<Task, StoreError> {
        let title = trimmed_title(self.title.as_deref())?;
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        let lifecycle = Lifecycle::reconcile(self.status.as_deref(), self.completed);
        let priority = self
            .priority
            .as_deref()
            .map(Priority::parse_lossy)
            .unwrap_or_default();
        let now = Utc::now();

        Ok(Task {
            id: Uuid::new_v4(),
            title,
            description,
            lifecycle,
            priority,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update. Only fields present here override the stored value; an
/// empty patch is a no-op touch that refreshes `updated_at` only.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

impl TaskPatch {
    /// Merge this patch into an existing task. The reconciliation rule is
    /// reapplied over the merged view: unsupplied status/completed carry
    /// over from the stored lifecycle, so flipping only `completed: true`
    /// on a todo task lands on done.
    pub(crate) fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(title) = self.title.as_deref() {
            task.title = trimmed_title(Some(title))?;
        }
        if let Some(description) = self.description.as_deref() {
            task.description = description.trim().to_string();
        }

        let merged_status = self
            .status
            .clone()
            .unwrap_or_else(|| task.lifecycle.as_str().to_string());
        let merged_completed = self.completed.unwrap_or(task.lifecycle.is_completed());
        task.lifecycle = Lifecycle::reconcile(Some(&merged_status), Some(merged_completed));

        if let Some(priority) = self.priority.as_deref() {
            task.priority = Priority::parse_lossy(priority);
        }
        task.updated_at = now;
        Ok(())
    }
}

fn trimmed_title(raw: Option<&str>) -> Result<String, StoreError> {
    let title = raw.map(str::trim).unwrap_or("");
    if title.is_empty() {
        return Err(StoreError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

/// Parse a caller-supplied id. Malformed ids surface as `NotFound` rather
/// than crashing or silently no-op'ing.
pub(crate) fn parse_task_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::NotFound(format!("Task {} not found", id)))
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// List up to [`MAX_LISTED_TASKS`] tasks, ordered by updated_at descending.
    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Create a new task and return it, including its assigned id.
    async fn create_task(&self, input: NewTask) -> Result<Task, StoreError>;

    /// Apply a partial update to an existing task.
    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<(), StoreError>;

    /// Delete a task permanently.
    async fn delete_task(&self, id: &str) -> Result<(), StoreError>;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    #[default]
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "memory" => Self::Memory,
            "sqlite" | "db" => Self::Sqlite,
            _ => Self::default(),
        }
    }
}

/// Create a task store based on the configured backend.
pub async fn create_task_store(config: &Config) -> Result<Box<dyn TaskStore>, StoreError> {
    match config.store_type {
        TaskStoreType::Memory => Ok(Box::new(InMemoryTaskStore::new())),
        TaskStoreType::Sqlite => {
            let data_dir = config
                .data_dir
                .clone()
                .ok_or_else(|| StoreError::Storage("no data dir configured".to_string()))?;
            let store = SqliteTaskStore::new(data_dir, &config.db_name).await?;
            Ok(Box::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> NewTask {
        NewTask {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_then_list_round_trips_with_defaults() {
        let store = InMemoryTaskStore::new();

        let created = store
            .create_task(NewTask {
                title: Some("  Plan launch  ".to_string()),
                description: Some("  checklist for the launch  ".to_string()),
                priority: Some("urgent".to_string()),
                ..Default::default()
            })
            .await
            .expect("Failed to create task");

        assert_eq!(created.title, "Plan launch");
        assert_eq!(created.description, "checklist for the launch");
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.lifecycle, Lifecycle::Todo);
        assert_eq!(created.created_at, created.updated_at);

        let listed = store.list_tasks().await.expect("Failed to list tasks");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
    }

    #[tokio::test]
    async fn whitespace_only_title_is_rejected() {
        let store = InMemoryTaskStore::new();

        let err = store.create_task(titled("   ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {:?}", err);

        let err = store.create_task(NewTask::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn completed_flag_alone_promotes_todo_to_done() {
        let store = InMemoryTaskStore::new();
        let created = store.create_task(titled("Write report")).await.unwrap();
        assert_eq!(created.lifecycle, Lifecycle::Todo);

        store
            .update_task(
                &created.id.to_string(),
                TaskPatch {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to update task");

        let listed = store.list_tasks().await.unwrap();
        assert_eq!(listed[0].lifecycle, Lifecycle::Done);
        assert!(listed[0].lifecycle.is_completed());
    }

    #[tokio::test]
    async fn patching_priority_preserves_untouched_fields() {
        let store = InMemoryTaskStore::new();
        let created = store
            .create_task(NewTask {
                title: Some("Review PR".to_string()),
                description: Some("backend changes".to_string()),
                status: Some("doing".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update_task(
                &created.id.to_string(),
                TaskPatch {
                    priority: Some("High".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let task = &store.list_tasks().await.unwrap()[0];
        assert_eq!(task.title, "Review PR");
        assert_eq!(task.description, "backend changes");
        assert_eq!(task.lifecycle, Lifecycle::Doing);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.created_at, created.created_at);
        assert!(task.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn empty_patch_is_a_touch() {
        let store = InMemoryTaskStore::new();
        let created = store.create_task(titled("Tidy backlog")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update_task(&created.id.to_string(), TaskPatch::default())
            .await
            .unwrap();

        let task = &store.list_tasks().await.unwrap()[0];
        assert_eq!(task.title, created.title);
        assert_eq!(task.lifecycle, created.lifecycle);
        assert!(task.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_rejects_empty_title() {
        let store = InMemoryTaskStore::new();
        let created = store.create_task(titled("Keep me")).await.unwrap();

        let err = store
            .update_task(
                &created.id.to_string(),
                TaskPatch {
                    title: Some("   ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        // Failed update must not have clobbered the stored title.
        assert_eq!(store.list_tasks().await.unwrap()[0].title, "Keep me");
    }

    #[tokio::test]
    async fn delete_removes_and_missing_ids_are_not_found() {
        let store = InMemoryTaskStore::new();
        let created = store.create_task(titled("Throwaway")).await.unwrap();

        let err = store
            .delete_task(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let err = store.delete_task("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        store.delete_task(&created.id.to_string()).await.unwrap();
        assert!(store.list_tasks().await.unwrap().is_empty());

        let err = store
            .update_task(&created.id.to_string(), TaskPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_caps_at_100_and_orders_by_updated_at() {
        let store = InMemoryTaskStore::new();
        let mut ids = Vec::new();
        for i in 0..105 {
            let task = store.create_task(titled(&format!("Task {}", i))).await.unwrap();
            ids.push(task.id);
        }

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update_task(
                &ids[3].to_string(),
                TaskPatch {
                    description: Some("bumped".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let listed = store.list_tasks().await.unwrap();
        assert_eq!(listed.len(), MAX_LISTED_TASKS);
        assert_eq!(listed[0].id, ids[3], "most recently touched task comes first");
        for pair in listed.windows(2) {
            assert!(pair[0].updated_at >= pair[1].updated_at);
        }
    }
}
