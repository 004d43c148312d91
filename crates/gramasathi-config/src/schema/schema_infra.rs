//! Browser and storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{default_true, gramasathi_dir};

/// Chrome connection and context pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome executable; auto-detected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Maximum number of isolated browser contexts open at once.
    #[serde(default = "default_max_contexts")]
    pub max_contexts: usize,

    /// How long a task waits for a free browser context.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: true,
            chrome_path: None,
            profile_dir: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            max_contexts: default_max_contexts(),
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

fn default_max_contexts() -> usize {
    4
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Document store and snapshot storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: "file" or "memory".
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: None,
            snapshot_dir: None,
        }
    }
}

impl StorageConfig {
    /// Document store root, `~/.gramasathi/data` by default.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| gramasathi_dir().join("data"))
    }

    /// Snapshot document directory, `~/.gramasathi/files` by default.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(|| gramasathi_dir().join("files"))
    }
}

fn default_backend() -> String {
    "file".to_string()
}
