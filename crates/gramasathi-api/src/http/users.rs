//! User handlers.
//!
//! Users are schemaless: every top-level key becomes a candidate form field.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use gramasathi_engine::{collections, now_timestamp};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Response to a create request.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

impl CreatedResponse {
    pub fn new(message: &str, id: String) -> Self {
        Self {
            message: message.to_string(),
            id,
        }
    }
}

/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(mut user): Json<Value>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let Some(fields) = user.as_object_mut() else {
        return Err(ApiError::BadRequest("user must be a JSON object".to_string()));
    };
    fields.insert("createdAt".to_string(), Value::String(now_timestamp()));

    let id = state.store().create(collections::USERS, user).await?;
    info!("User created: {}", id);
    Ok(Json(CreatedResponse::new("User added", id)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.store().get(collections::USERS, &id).await? {
        Some(mut user) => {
            if let Some(fields) = user.as_object_mut() {
                fields.insert("id".to_string(), Value::String(id));
            }
            Ok(Json(user))
        }
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}
