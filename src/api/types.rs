//! API request and response types.
//!
//! The dual `status`/`completed` shape clients see is derived here from
//! the stored canonical lifecycle; it exists only on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Lifecycle, Task};

/// A task as serialized to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Stable identifier assigned by the store
    pub id: String,

    pub title: String,

    pub description: String,

    /// Derived from the lifecycle: "todo", "doing" or "done"
    pub status: Lifecycle,

    /// Derived from the lifecycle; true iff status is "done"
    pub completed: bool,

    /// "High", "Medium" or "Low"
    pub priority: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title,
            description: task.description,
            status: task.lifecycle,
            completed: task.lifecycle.is_completed(),
            priority: task.priority.as_str().to_string(),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Request to create a task. Only `title` is required; `status` and
/// `priority` arrive as free-form strings and are coerced by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// Partial update request. The target id travels in the body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// Delete request.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTaskRequest {
    pub id: Option<String>,
}

/// Response for the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<TaskView>,
}

/// Response after creating a task: the full newly created record.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskResponse {
    pub task: TaskView,
}

/// Response after a successful update.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateTaskResponse {
    pub updated: bool,
}

/// Response after a successful delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteTaskResponse {
    pub deleted: bool,
}

/// Error body for every failure response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Whether the configured store persists across restarts
    pub persistent: bool,
}
