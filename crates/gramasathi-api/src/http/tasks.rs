//! Form automation task handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use gramasathi_engine::{collections, TaskReport, TaskRequest};
use serde_json::Value;
use tracing::{error, info};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /tasks
///
/// The task runs on its own tokio task, so a client disconnect does not
/// abandon a browsing context or leave the task pending.
pub async fn run_task(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<TaskReport>, ApiError> {
    info!(
        "Task request: user={} title={} form={}",
        request.user_id, request.title, request.form_link
    );

    let orchestrator = state.orchestrator.clone();
    let handle = tokio::spawn(async move { orchestrator.run(request).await });

    match handle.await {
        Ok(result) => Ok(Json(result?)),
        Err(e) => {
            error!("Task runner panicked or was cancelled: {}", e);
            Err(ApiError::Internal(format!("task runner failed: {}", e)))
        }
    }
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.store().get(collections::TASKS, &id).await? {
        Some(mut task) => {
            if let Some(fields) = task.as_object_mut() {
                fields.insert("id".to_string(), Value::String(id));
            }
            Ok(Json(task))
        }
        None => Err(ApiError::NotFound("Task not found".to_string())),
    }
}
