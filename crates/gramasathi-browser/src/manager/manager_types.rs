//! Browser pool errors and configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::cdp::CdpError;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Cannot reach Chrome: {0}")]
    Unreachable(String),

    #[error("Chrome could not be started: {0}")]
    LaunchFailed(String),

    #[error("No Chrome executable found; install Chrome or set browser.chrome_path")]
    ChromeNotFound,

    #[error("Not connected to Chrome")]
    NotConnected,

    /// Every context slot stayed busy for the whole acquire timeout.
    #[error("All browser contexts busy for {0:?}")]
    ContextUnavailable(Duration),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Page command failed: {0}")]
    CommandFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Unreachable(msg) | CdpError::Handshake(msg) => BrowserError::Unreachable(msg),
            CdpError::Navigation { url, reason } => {
                BrowserError::NavigationFailed(format!("{}: {}", url, reason))
            }
            CdpError::NoSuchElement(what) => BrowserError::ElementNotFound(what),
            CdpError::Closed => BrowserError::NotConnected,
            other => BrowserError::CommandFailed(other.to_string()),
        }
    }
}

/// How the pool launches Chrome and how many contexts it hands out.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Profile of the launched Chrome; `~/.gramasathi/browser-profile` when unset.
    pub profile_dir: Option<PathBuf>,
    /// Explicit Chrome executable; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Contexts that may be leased at once. Zero is treated as one.
    pub max_contexts: usize,
    /// How long `acquire_context` waits for a free slot.
    pub acquire_timeout: Duration,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self {
            debug_port: 9222,
            viewport_width: 1280,
            viewport_height: 720,
            profile_dir: None,
            chrome_path: None,
            headless: true,
            max_contexts: 4,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserManagerConfig {
    pub fn resolved_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".gramasathi")
                .join("browser-profile")
        })
    }

    /// HTTP endpoint of the DevTools server.
    pub fn devtools_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    /// Command line for a Chrome that serves DevTools on `debug_port`.
    pub fn launch_args(&self, profile_dir: &Path) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            format!("--user-data-dir={}", profile_dir.display()),
            format!("--window-size={},{}", self.viewport_width, self.viewport_height),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-sync".to_string(),
            "--disable-translate".to_string(),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }
        args
    }
}
