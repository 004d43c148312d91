//! File-backed document store: `<root>/<collection>/<id>.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::{merge_patch, validate_key, DocumentStore, StoreError};

/// File-based document store.
pub struct FileDocumentStore {
    directory: PathBuf,
    /// Serializes read-modify-write updates.
    write_lock: Mutex<()>,
}

impl FileDocumentStore {
    /// Create a new file document store rooted at `directory`.
    pub fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            write_lock: Mutex::new(()),
        }
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf, StoreError> {
        validate_key(collection)?;
        Ok(self.directory.join(collection))
    }

    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf, StoreError> {
        validate_key(id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }

    async fn write(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(self.collection_dir(collection)?).await?;

        let path = self.document_path(collection, id)?;
        let json = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&path, json).await?;
        debug!("Saved document {}/{} to {:?}", collection, id, path);
        Ok(())
    }

    async fn read(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let path = self.document_path(collection, id)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&json)?))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        if !document.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let _guard = self.write_lock.lock().await;
        self.write(collection, id, &document).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.read(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self
            .read(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_patch(&mut document, patch)?;
        self.write(collection, id, &document).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let dir = self.collection_dir(collection)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(id) = name.strip_suffix(".json") {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(document) = self.read(collection, &id).await? {
                documents.push((id, document));
            }
        }
        Ok(documents)
    }
}
