//! Task records and form sources.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::EngineError;
use crate::resolver::FormRegistry;
use crate::store::now_timestamp;

/// Task lifecycle. `pending -> {completed, failed}`, both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// A persisted form automation task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Document id; not part of the stored body.
    #[serde(skip)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub form_link: String,
    pub status: TaskStatus,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<String>,
}

impl Task {
    /// A new task in the `pending` state.
    pub fn pending(
        id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        form_link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: title.into(),
            form_link: form_link.into(),
            status: TaskStatus::Pending,
            created_at: now_timestamp(),
            completed_at: None,
            error: None,
            failed_at: None,
        }
    }

    /// Stored JSON body (without the id).
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// The document a task automates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSource {
    /// Exact key of a known form in the registry.
    Registered(String),
    /// An http, https or file URL.
    Url(Url),
    /// A local HTML file.
    LocalFile(PathBuf),
}

impl FormSource {
    /// Classify a raw form link. Relative paths resolve against `forms_dir`.
    pub fn parse(raw: &str, registry: &FormRegistry, forms_dir: &Path) -> Result<Self, EngineError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EngineError::InvalidFormSource("empty form link".to_string()));
        }

        if registry.contains(raw) {
            return Ok(FormSource::Registered(raw.to_string()));
        }

        if let Ok(url) = Url::parse(raw) {
            if matches!(url.scheme(), "http" | "https" | "file") {
                return Ok(FormSource::Url(url));
            }
        }

        let path = Path::new(raw);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            forms_dir.join(path)
        };
        Ok(FormSource::LocalFile(path))
    }

    /// Registry key, when this source is a known form.
    pub fn registry_key(&self) -> Option<&str> {
        match self {
            FormSource::Registered(key) => Some(key),
            _ => None,
        }
    }

    /// URL the browser should load.
    pub fn document_url(&self) -> Result<String, EngineError> {
        match self {
            FormSource::Registered(key) => Ok(key.clone()),
            FormSource::Url(url) => Ok(url.to_string()),
            FormSource::LocalFile(path) => Url::from_file_path(path)
                .map(|url| url.to_string())
                .map_err(|_| {
                    EngineError::InvalidFormSource(format!(
                        "cannot build a file URL from {}",
                        path.display()
                    ))
                }),
        }
    }
}
