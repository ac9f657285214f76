//! HTTP API for the task workspace.
//!
//! ## Endpoints
//!
//! - `GET /api/tasks` - List tasks, most recently updated first
//! - `POST /api/tasks` - Create a task
//! - `PUT /api/tasks` - Partially update a task (id in body)
//! - `DELETE /api/tasks` - Delete a task (id in body)
//! - `GET /api/health` - Health check

mod routes;
pub mod task_store;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
