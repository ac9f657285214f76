//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;

use super::task_store::{self, NewTask, StoreError, TaskPatch, TaskStore};
use super::types::*;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// The task store backend selected at startup
    pub store: Box<dyn TaskStore>,
}

/// Error response carrying a status code and an `{ "error": msg }` body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(message) => Self {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            StoreError::NotFound(message) => Self {
                status: StatusCode::NOT_FOUND,
                message,
            },
            StoreError::Storage(detail) => {
                // Storage detail stays in the logs; clients get a generic message.
                tracing::error!("task store failure: {}", detail);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "task store unavailable".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = task_store::create_task_store(&config).await?;
    if !store.is_persistent() {
        tracing::warn!("Using the in-memory task store; tasks will not survive a restart");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
    });

    let app = router(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router (separate from `serve` so tests can drive
/// it without binding a socket).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/tasks",
            get(list_tasks)
                .post(create_task)
                .put(update_task)
                .delete(delete_task),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        persistent: state.store.is_persistent(),
    })
}

/// List tasks, most recently touched first.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let tasks = state.store.list_tasks().await?;
    Ok(Json(ListTasksResponse {
        tasks: tasks.into_iter().map(TaskView::from).collect(),
    }))
}

/// Create a new task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<Json<CreateTaskResponse>, ApiError> {
    let Json(req) = payload.map_err(malformed_body)?;

    let task = state
        .store
        .create_task(NewTask {
            title: req.title,
            description: req.description,
            status: req.status,
            completed: req.completed,
            priority: req.priority,
        })
        .await?;

    Ok(Json(CreateTaskResponse { task: task.into() }))
}

/// Apply a partial update to a task.
async fn update_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<UpdateTaskResponse>, ApiError> {
    let Json(req) = payload.map_err(malformed_body)?;
    let id = req.id.ok_or_else(|| ApiError::bad_request("id is required"))?;

    state
        .store
        .update_task(
            &id,
            TaskPatch {
                title: req.title,
                description: req.description,
                status: req.status,
                completed: req.completed,
                priority: req.priority,
            },
        )
        .await?;

    Ok(Json(UpdateTaskResponse { updated: true }))
}

/// Delete a task.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DeleteTaskRequest>, JsonRejection>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
    let Json(req) = payload.map_err(malformed_body)?;
    let id = req.id.ok_or_else(|| ApiError::bad_request("id is required"))?;

    state.store.delete_task(&id).await?;

    Ok(Json(DeleteTaskResponse { deleted: true }))
}
