//! Engine and task error types.

use gramasathi_browser::{BrowserError, CdpError};
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while driving a page.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The form document could not be loaded.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Rendering or storing a snapshot failed.
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    /// No browsing context could be obtained.
    #[error("Browsing context unavailable: {0}")]
    ContextUnavailable(String),

    /// The form source is neither a URL nor a usable local path.
    #[error("Invalid form source: {0}")]
    InvalidFormSource(String),

    /// A page interaction failed.
    #[error("Page error: {0}")]
    Page(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CdpError> for EngineError {
    fn from(e: CdpError) -> Self {
        EngineError::Browser(BrowserError::from(e))
    }
}

/// Result of a task invocation that did not produce a report.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A required argument is missing or empty. No task was created.
    #[error("{0}")]
    Validation(String),

    /// The user id does not resolve. No task was created.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The store failed before the task could be created.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The task was created and then failed; its failed status is persisted.
    #[error("Task {task_id} failed: {source}")]
    Failed {
        task_id: String,
        #[source]
        source: EngineError,
    },
}

impl TaskError {
    /// Id of the persisted task, if one was created.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            TaskError::Failed { task_id, .. } => Some(task_id),
            _ => None,
        }
    }
}
