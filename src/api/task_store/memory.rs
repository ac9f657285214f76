//! In-memory task store (non-persistent).

use super::{parse_task_id, NewTask, StoreError, TaskPatch, TaskStore, MAX_LISTED_TASKS};
use crate::task::Task;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        tasks.truncate(MAX_LISTED_TASKS);
        Ok(tasks)
    }

    async fn create_task(&self, input: NewTask) -> Result<Task, StoreError> {
        let task = input.into_task()?;
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<(), StoreError> {
        let id = parse_task_id(id)?;
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("Task {} not found", id)))?;
        patch.apply_to(task, Utc::now())
    }

    async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_task_id(id)?;
        if self.tasks.write().await.remove(&id).is_none() {
            return Err(StoreError::NotFound(format!("Task {} not found", id)));
        }
        Ok(())
    }
}
