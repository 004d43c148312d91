//! API error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gramasathi_engine::{StoreError, TaskError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request body or arguments.
    #[error("{0}")]
    BadRequest(String),

    /// Unknown resource.
    #[error("{0}")]
    NotFound(String),

    /// A task was created and then failed.
    #[error("{message}")]
    TaskFailed { task_id: String, message: String },

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TaskFailed { .. } | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } | StoreError::InvalidKey(_) => ApiError::NotFound(e.to_string()),
            StoreError::NotAnObject => ApiError::BadRequest(e.to_string()),
            StoreError::Io(_) | StoreError::Serialization(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        match e {
            TaskError::Validation(msg) => ApiError::BadRequest(msg),
            TaskError::UserNotFound(_) => ApiError::NotFound("User not found".to_string()),
            TaskError::Store(store) => ApiError::from(store),
            TaskError::Failed { task_id, source } => ApiError::TaskFailed {
                task_id,
                message: source.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        let body = match &self {
            ApiError::TaskFailed { task_id, message } => json!({
                "error": message,
                "taskId": task_id,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramasathi_engine::EngineError;

    #[test]
    fn test_task_error_mapping() {
        let err = ApiError::from(TaskError::Validation("userId, title, formLink required".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(TaskError::UserNotFound("u9".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "User not found");

        let err = ApiError::from(TaskError::Failed {
            task_id: "t1".into(),
            source: EngineError::Snapshot("printToPDF failed".into()),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(err, ApiError::TaskFailed { ref task_id, .. } if task_id == "t1"));
    }

    #[test]
    fn test_store_error_mapping() {
        let missing = StoreError::NotFound {
            collection: "messages".into(),
            id: "m1".into(),
        };
        assert_eq!(ApiError::from(missing).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::InvalidKey("../x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::from(StoreError::NotAnObject).status(), StatusCode::BAD_REQUEST);
    }
}
