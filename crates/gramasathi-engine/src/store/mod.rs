//! Document persistence.
//!
//! A minimal key-value document store: JSON objects addressed by collection
//! name and id, with create, read-by-id and shallow partial update.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;

/// Collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TASKS: &str = "tasks";
    pub const MESSAGES: &str = "messages";
    pub const STATUS_LOGS: &str = "status_logs";
}

/// Store error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Document must be a JSON object")]
    NotAnObject,
}

/// Document store trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert or replace a document under a caller-chosen id.
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Load a document by id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Merge the top-level keys of `patch` into an existing document.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// All documents of a collection as `(id, document)` pairs.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Insert a document under a fresh id and return the id.
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let id = new_id();
        self.put(collection, &id, document).await?;
        Ok(id)
    }
}

/// Fresh document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current time as an RFC 3339 UTC timestamp.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Collection names and ids end up in file paths.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

pub(crate) fn merge_patch(target: &mut Value, patch: Value) -> Result<(), StoreError> {
    let (Some(target), Value::Object(patch)) = (target.as_object_mut(), patch) else {
        return Err(StoreError::NotAnObject);
    };
    for (key, value) in patch {
        target.insert(key, value);
    }
    Ok(())
}

/// Immutable audit entry for a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLog {
    pub subject: String,
    pub subject_id: String,
    pub new_status: String,
    pub changed_at: String,
}

impl StatusLog {
    pub fn new(subject: &str, subject_id: &str, new_status: &str) -> Self {
        Self {
            subject: subject.to_string(),
            subject_id: subject_id.to_string(),
            new_status: new_status.to_string(),
            changed_at: now_timestamp(),
        }
    }

    /// Append a log entry. Failures are logged, never propagated.
    pub async fn record(store: &dyn DocumentStore, subject: &str, subject_id: &str, new_status: &str) {
        let entry = Self::new(subject, subject_id, new_status);
        let document = match serde_json::to_value(&entry) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to encode status log for {} {}: {}", subject, subject_id, e);
                return;
            }
        };
        if let Err(e) = store.create(collections::STATUS_LOGS, document).await {
            warn!("Failed to append status log for {} {}: {}", subject, subject_id, e);
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
