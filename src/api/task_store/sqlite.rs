//! SQLite-based task store.
//!
//! A single connection behind a mutex; every call runs on the blocking
//! pool. Rows are normalized on read, so legacy rows with an unknown
//! state or priority never leak an inconsistent task to callers.

use super::{parse_task_id, NewTask, StoreError, TaskPatch, TaskStore, MAX_LISTED_TASKS};
use crate::task::{Lifecycle, Priority, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    state TEXT NOT NULL DEFAULT 'todo',
    priority TEXT NOT NULL DEFAULT 'Medium',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_updated_at ON tasks(updated_at DESC);
"#;

const TASK_COLUMNS: &str = "id, title, description, state, priority, created_at, updated_at";

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTaskStore {
    pub async fn new(data_dir: PathBuf, db_name: &str) -> Result<Self, StoreError> {
        let db_path = data_dir.join(format!("{}.db", db_name));

        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to create data dir: {}", e)))?;

        let conn = tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)
                .map_err(|e| StoreError::Storage(format!("Failed to open SQLite database: {}", e)))?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| StoreError::Storage(format!("Failed to run schema: {}", e)))?;
            Ok::<_, StoreError>(conn)
        })
        .await
        .map_err(|e| StoreError::Storage(format!("Task join error: {}", e)))??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Map a row into a task, applying the normalization rules to whatever is
/// actually stored.
fn task_from_row(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let state: String = row.get(3)?;
    let priority: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Task {
        id: Uuid::parse_str(&id_str).unwrap_or_default(),
        title: row.get(1)?,
        description: row.get(2)?,
        lifecycle: Lifecycle::reconcile(Some(&state), None),
        priority: Priority::parse_lossy(&priority),
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM tasks ORDER BY updated_at DESC LIMIT ?1",
                    TASK_COLUMNS
                ))
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            let tasks = stmt
                .query_map(params![MAX_LISTED_TASKS as i64], task_from_row)
                .map_err(|e| StoreError::Storage(e.to_string()))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            Ok(tasks)
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    async fn create_task(&self, input: NewTask) -> Result<Task, StoreError> {
        let task = input.into_task()?;
        let conn = self.conn.clone();

        let t = task.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO tasks (id, title, description, state, priority, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    t.id.to_string(),
                    t.title,
                    t.description,
                    t.lifecycle.as_str(),
                    t.priority.as_str(),
                    t.created_at.to_rfc3339(),
                    t.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::Storage(e.to_string()))?;
            Ok::<_, StoreError>(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))??;

        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<(), StoreError> {
        let id = parse_task_id(id)?;
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let id_str = id.to_string();

            let existing: Option<Task> = conn
                .query_row(
                    &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                    params![&id_str],
                    task_from_row,
                )
                .optional()
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            let mut task = existing
                .ok_or_else(|| StoreError::NotFound(format!("Task {} not found", id)))?;
            patch.apply_to(&mut task, Utc::now())?;

            conn.execute(
                "UPDATE tasks SET title = ?1, description = ?2, state = ?3, priority = ?4, updated_at = ?5
                 WHERE id = ?6",
                params![
                    task.title,
                    task.description,
                    task.lifecycle.as_str(),
                    task.priority.as_str(),
                    task.updated_at.to_rfc3339(),
                    id_str,
                ],
            )
            .map_err(|e| StoreError::Storage(e.to_string()))?;

            Ok(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }

    async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_task_id(id)?;
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            let rows = conn
                .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("Task {} not found", id)));
            }
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?
    }
}
