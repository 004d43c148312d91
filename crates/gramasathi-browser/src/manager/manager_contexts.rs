//! Isolated browser context leasing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, warn};

use crate::cdp::{CdpClient, PageSession};
use super::{BrowserError, BrowserManager};

impl BrowserManager {
    /// Lease a fresh isolated browser context with one blank page in it.
    ///
    /// Waits at most `acquire_timeout` for a free slot, then fails with
    /// [`BrowserError::ContextUnavailable`].
    pub async fn acquire_context(&self) -> Result<ContextLease, BrowserError> {
        let timeout = self.config.acquire_timeout;
        let permit = match tokio::time::timeout(timeout, self.slots.clone().acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(BrowserError::NotConnected),
            Err(_) => {
                warn!("No browser context became available within {:?}", timeout);
                return Err(BrowserError::ContextUnavailable(timeout));
            }
        };

        let client = self.connected_client().await?;

        let context_id = client.create_browser_context().await?;
        let session = match client.new_page_in_context(&context_id).await {
            Ok(session) => session,
            Err(e) => {
                let _ = client.dispose_browser_context(&context_id).await;
                return Err(e.into());
            }
        };

        if let Err(e) = session
            .call(
                "Emulation.setDeviceMetricsOverride",
                Some(json!({
                    "width": self.config.viewport_width,
                    "height": self.config.viewport_height,
                    "deviceScaleFactor": 1,
                    "mobile": false,
                })),
            )
            .await
        {
            warn!("Failed to set viewport for context {}: {}", context_id, e);
        }

        debug!(
            "Leased browser context {} ({} slots left)",
            context_id,
            self.slots.available_permits()
        );

        Ok(ContextLease {
            client,
            context_id,
            session: Arc::new(session),
            released: AtomicBool::new(false),
            _permit: permit,
        })
    }
}

/// An isolated browser context held by one task.
///
/// Call [`release`](Self::release) when done. Dropping an unreleased lease
/// schedules the same cleanup on the current runtime.
pub struct ContextLease {
    client: Arc<CdpClient>,
    context_id: String,
    session: Arc<PageSession>,
    released: AtomicBool,
    _permit: OwnedSemaphorePermit,
}

impl ContextLease {
    /// Browser context id.
    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    /// The page opened inside this context.
    pub fn page(&self) -> &Arc<PageSession> {
        &self.session
    }

    /// Close the page and dispose the context. Idempotent.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        dispose(
            self.client.clone(),
            self.context_id.clone(),
            self.session.target_id().to_string(),
            self.session.session_id().to_string(),
        )
        .await;
    }
}

impl Drop for ContextLease {
    fn drop(&mut self) {
        if self.released.load(Ordering::SeqCst) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(dispose(
                    self.client.clone(),
                    self.context_id.clone(),
                    self.session.target_id().to_string(),
                    self.session.session_id().to_string(),
                ));
            }
            Err(_) => warn!(
                "Browser context {} dropped outside a runtime; leaking it",
                self.context_id
            ),
        }
    }
}

async fn dispose(client: Arc<CdpClient>, context_id: String, target_id: String, session_id: String) {
    if let Err(e) = client.close_page(&target_id).await {
        debug!("Closing target {} failed: {}", target_id, e);
    }
    if let Err(e) = client.dispose_browser_context(&context_id).await {
        warn!("Disposing browser context {} failed: {}", context_id, e);
    }
    client.forget_session(&session_id).await;
    debug!("Released browser context {}", context_id);
}
