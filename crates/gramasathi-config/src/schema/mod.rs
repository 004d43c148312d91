//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

mod schema_forms;
mod schema_infra;

pub use schema_forms::*;
pub use schema_infra::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Base directory for GramaSathi state (`~/.gramasathi`).
pub fn gramasathi_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gramasathi")
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub heuristics: HeuristicsConfig,

    /// Known forms: exact form URL -> (semantic field -> locator).
    #[serde(default = "default_registry")]
    pub registry: HashMap<String, HashMap<String, String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            browser: BrowserConfig::default(),
            engine: EngineConfig::default(),
            storage: StorageConfig::default(),
            heuristics: HeuristicsConfig::default(),
            registry: default_registry(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: true,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Timing and path settings for the form automation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bounded wait for a field locator to appear.
    #[serde(default = "default_locator_timeout")]
    pub locator_timeout_ms: u64,

    /// Delay between typed characters.
    #[serde(default = "default_keystroke_delay")]
    pub keystroke_delay_ms: u64,

    /// Bounded wait for a page load after the submit click.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Bounded wait for a native dialog after the submit click.
    #[serde(default = "default_dialog_timeout")]
    pub dialog_timeout_ms: u64,

    /// Settle delay that ends the submission race when nothing else fires.
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Fixed delay between submission and the "after" snapshot.
    #[serde(default = "default_settle")]
    pub post_submit_settle_ms: u64,

    /// Base directory for relative local form paths.
    #[serde(default)]
    pub forms_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            locator_timeout_ms: default_locator_timeout(),
            keystroke_delay_ms: default_keystroke_delay(),
            navigation_timeout_ms: default_navigation_timeout(),
            dialog_timeout_ms: default_dialog_timeout(),
            settle_ms: default_settle(),
            post_submit_settle_ms: default_settle(),
            forms_dir: None,
        }
    }
}

impl EngineConfig {
    /// Directory used to resolve relative local form paths.
    pub fn forms_dir(&self) -> PathBuf {
        self.forms_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

fn default_locator_timeout() -> u64 {
    2000
}

fn default_keystroke_delay() -> u64 {
    25
}

fn default_navigation_timeout() -> u64 {
    5000
}

fn default_dialog_timeout() -> u64 {
    5000
}

fn default_settle() -> u64 {
    2000
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
