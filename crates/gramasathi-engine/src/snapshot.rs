//! Page snapshots rendered to PDF and published under `/files/`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::page::FormPage;
use crate::store::StoreError;

/// URL prefix under which stored snapshots are served.
pub const FILES_PREFIX: &str = "/files";

/// Where rendered snapshots are kept.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Store `bytes` as `name` and return its addressable path.
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, StoreError>;
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(name.to_string()))
    }
}

fn public_path(name: &str) -> String {
    format!("{}/{}", FILES_PREFIX, name)
}

/// Writes snapshots into a directory served statically.
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    directory: PathBuf,
}

impl FileSnapshotSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl SnapshotSink for FileSnapshotSink {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        validate_name(name)?;
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.directory.join(name);
        tokio::fs::write(&path, &bytes).await?;
        debug!("Wrote snapshot {} ({} bytes)", path.display(), bytes.len());
        Ok(public_path(name))
    }
}

/// Keeps snapshots in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotSink {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.read().get(name).cloned()
    }

    /// Stored names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl SnapshotSink for MemorySnapshotSink {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        validate_name(name)?;
        self.files.write().insert(name.to_string(), bytes);
        Ok(public_path(name))
    }
}

/// Renders the current page and hands it to a [`SnapshotSink`].
#[derive(Clone)]
pub struct SnapshotCapturer {
    sink: Arc<dyn SnapshotSink>,
}

impl SnapshotCapturer {
    pub fn new(sink: Arc<dyn SnapshotSink>) -> Self {
        Self { sink }
    }

    /// Render the page as an A4 PDF.
    pub async fn capture(&self, page: &dyn FormPage) -> Result<Vec<u8>, EngineError> {
        page.print_pdf()
            .await
            .map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Render the page and store it as `name`. Returns the addressable path.
    pub async fn capture_to(&self, page: &dyn FormPage, name: &str) -> Result<String, EngineError> {
        let bytes = self.capture(page).await?;
        let size = bytes.len();
        let path = self
            .sink
            .store(name, bytes)
            .await
            .map_err(|e| EngineError::Snapshot(format!("{}: {}", name, e)))?;
        info!("Captured snapshot {} ({} bytes)", path, size);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;

    #[tokio::test]
    async fn test_file_sink_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSnapshotSink::new(dir.path().join("snapshots"));

        let path = sink.store("t1-before.pdf", b"%PDF".to_vec()).await.unwrap();

        assert_eq!(path, "/files/t1-before.pdf");
        let written = std::fs::read(dir.path().join("snapshots/t1-before.pdf")).unwrap();
        assert_eq!(written, b"%PDF");
    }

    #[tokio::test]
    async fn test_sinks_reject_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileSnapshotSink::new(dir.path());
        let memory = MemorySnapshotSink::new();

        for name in ["../escape.pdf", ".hidden", "a/b.pdf", ""] {
            assert!(file.store(name, vec![1]).await.is_err(), "{name}");
            assert!(memory.store(name, vec![1]).await.is_err(), "{name}");
        }
        assert!(memory.names().is_empty());
    }

    #[tokio::test]
    async fn test_capture_to_stores_rendered_pdf() {
        let sink = Arc::new(MemorySnapshotSink::new());
        let capturer = SnapshotCapturer::new(sink.clone());
        let page = FakePage::new();

        let path = capturer.capture_to(&page, "t2-after.pdf").await.unwrap();

        assert_eq!(path, "/files/t2-after.pdf");
        assert_eq!(sink.get("t2-after.pdf").unwrap(), b"%PDF-1.4 fake #1");
        assert_eq!(sink.names(), vec!["t2-after.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_render_failure_is_snapshot_error() {
        let capturer = SnapshotCapturer::new(Arc::new(MemorySnapshotSink::new()));
        let page = FakePage::new();
        page.fail_print();

        let err = capturer.capture_to(&page, "t3-before.pdf").await.unwrap_err();
        assert!(matches!(err, EngineError::Snapshot(_)));
        assert_eq!(err.to_string(), "Snapshot failed: Page error: printToPDF failed");
    }
}
