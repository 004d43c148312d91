//! Citizen message handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use gramasathi_engine::{collections, now_timestamp, StatusLog};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::http::users::CreatedResponse;
use crate::state::AppState;

/// Messages are addressed to the backend itself.
const RECEIVER: &str = "system";

/// Allowed message statuses.
pub const MESSAGE_STATUSES: &[&str] = &["new", "pending", "resolved"];

/// POST /messages body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub sender_id: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub case_id: Option<String>,
}

/// POST /messages/withMetadata body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithMetadata {
    pub sender_id: Option<String>,
    pub content: Option<String>,
    pub intent: Option<String>,
    pub language: Option<String>,
    pub status: Option<String>,
}

/// PATCH /messages/{id}/status body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdated {
    pub message: String,
}

/// POST /messages
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewMessage>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let document = json!({
        "senderId": body.sender_id,
        "receiverId": RECEIVER,
        "content": body.content,
        "type": body.kind,
        "caseId": body.case_id,
        "timestamp": now_timestamp(),
        "status": "new",
    });
    let id = state.store().create(collections::MESSAGES, document).await?;
    info!("Message stored: {}", id);
    Ok(Json(CreatedResponse::new("Message stored", id)))
}

/// POST /messages/withMetadata
pub async fn create_message_with_metadata(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MessageWithMetadata>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let document = json!({
        "senderId": body.sender_id,
        "receiverId": RECEIVER,
        "content": body.content,
        "intent": body.intent,
        "language": body.language,
        "status": body.status,
        "timestamp": now_timestamp(),
    });
    let id = state.store().create(collections::MESSAGES, document).await?;
    info!("Message with metadata stored: {}", id);
    Ok(Json(CreatedResponse::new("Message with metadata stored", id)))
}

/// PATCH /messages/{id}/status
pub async fn update_message_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<StatusUpdated>, ApiError> {
    let status = body
        .status
        .filter(|s| MESSAGE_STATUSES.contains(&s.as_str()))
        .ok_or_else(|| ApiError::BadRequest("Invalid status".to_string()))?;

    let patch: Value = json!({
        "status": status,
        "lastUpdated": now_timestamp(),
    });
    state
        .store()
        .update(collections::MESSAGES, &id, patch)
        .await?;
    StatusLog::record(state.store().as_ref(), collections::MESSAGES, &id, &status).await;

    info!("Message {} status -> {}", id, status);
    Ok(Json(StatusUpdated {
        message: format!("Status updated to {}", status),
    }))
}
