//! Application state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use gramasathi_engine::{DocumentStore, TaskOrchestrator};

/// State shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<TaskOrchestrator>,
    /// Directory served under `/files`.
    pub snapshot_dir: PathBuf,
    start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: Arc<TaskOrchestrator>, snapshot_dir: PathBuf) -> Self {
        Self {
            orchestrator,
            snapshot_dir,
            start_time: Instant::now(),
        }
    }

    /// The document store the orchestrator persists into.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        self.orchestrator.store()
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
