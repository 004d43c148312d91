//! Chrome discovery, launch, and the shared DevTools connection.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::CdpClient;

/// How long a freshly launched Chrome gets to start serving DevTools.
const STARTUP_TIMEOUT: Duration = Duration::from_secs(6);
const STARTUP_POLL: Duration = Duration::from_millis(200);

#[cfg(target_os = "macos")]
const CHROME_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "linux")]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(target_os = "windows")]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CHROME_CANDIDATES: &[&str] = &[];

/// Owns the Chrome connection and the pool of isolated contexts.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    pub(super) client: RwLock<Option<Arc<CdpClient>>>,
    /// One permit per context that may be alive at once.
    pub(super) slots: Arc<Semaphore>,
    /// Set only when this manager launched Chrome itself.
    chrome: RwLock<Option<Child>>,
}

impl BrowserManager {
    /// Create a manager. Nothing is launched until the first context is acquired.
    pub fn new(config: BrowserManagerConfig) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_contexts.max(1)));
        Self {
            config,
            client: RwLock::new(None),
            slots,
            chrome: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// Contexts that can be leased right now without waiting.
    pub fn available_contexts(&self) -> usize {
        self.slots.available_permits()
    }

    /// First well-known Chrome install that exists on this machine.
    pub fn find_chrome() -> Option<PathBuf> {
        CHROME_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Configured path first, then auto-detection.
    pub(super) fn resolve_chrome(&self) -> Result<PathBuf, BrowserError> {
        match &self.config.chrome_path {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(BrowserError::LaunchFailed(format!(
                "configured chrome_path does not exist: {}",
                path.display()
            ))),
            None => Self::find_chrome().ok_or(BrowserError::ChromeNotFound),
        }
    }

    async fn devtools_alive(&self) -> bool {
        CdpClient::version(&self.config.devtools_url()).await.is_ok()
    }

    async fn spawn_chrome(&self) -> Result<Child, BrowserError> {
        let binary = self.resolve_chrome()?;
        let profile_dir = self.config.resolved_profile_dir();
        if let Err(e) = tokio::fs::create_dir_all(&profile_dir).await {
            warn!("Cannot create Chrome profile {}: {}", profile_dir.display(), e);
        }

        let child = Command::new(&binary)
            .args(self.config.launch_args(&profile_dir))
            .kill_on_drop(true)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(format!("{}: {}", binary.display(), e)))?;

        info!(
            "Launched Chrome (pid {:?}) with profile {}",
            child.id(),
            profile_dir.display()
        );
        Ok(child)
    }

    async fn wait_until_ready(&self) -> Result<(), BrowserError> {
        let ready = tokio::time::timeout(STARTUP_TIMEOUT, async {
            while !self.devtools_alive().await {
                tokio::time::sleep(STARTUP_POLL).await;
            }
        })
        .await;

        ready.map_err(|_| {
            BrowserError::LaunchFailed(format!(
                "DevTools did not come up on port {} within {:?}",
                self.config.debug_port, STARTUP_TIMEOUT
            ))
        })
    }

    /// Connect to Chrome on `debug_port`, launching it first if nothing listens there.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        let mut client = self.client.write().await;
        if client.is_some() {
            return Ok(());
        }

        if self.devtools_alive().await {
            info!("Reusing Chrome on port {}", self.config.debug_port);
        } else {
            let child = self.spawn_chrome().await?;
            *self.chrome.write().await = Some(child);
            self.wait_until_ready().await?;
        }

        *client = Some(Arc::new(CdpClient::connect(&self.config.devtools_url()).await?));
        info!("Connected to Chrome at {}", self.config.devtools_url());
        Ok(())
    }

    pub(super) async fn connected_client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        if let Some(client) = self.client.read().await.clone() {
            return Ok(client);
        }
        self.connect().await?;
        self.client
            .read()
            .await
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    /// Drop the DevTools connection; a later acquire reconnects.
    pub async fn disconnect(&self) {
        if self.client.write().await.take().is_some() {
            info!("Disconnected from Chrome");
        }
    }

    /// Disconnect, and kill Chrome if this manager launched it.
    pub async fn shutdown(&self) {
        self.disconnect().await;
        if let Some(mut child) = self.chrome.write().await.take() {
            info!("Stopping Chrome");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop Chrome: {}", e);
            }
        }
    }
}
