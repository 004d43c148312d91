//! Event subscription and native dialog handling.

use serde_json::{json, Value};
use tokio::sync::oneshot;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

/// A one-shot wait for the next occurrence of a CDP event.
///
/// Subscribe *before* triggering the action that fires the event, otherwise
/// the event can arrive before anyone is listening. Dropping the subscription
/// cancels it.
#[derive(Debug)]
pub struct EventSubscription {
    rx: oneshot::Receiver<Value>,
}

impl EventSubscription {
    /// Wait for the event and return its params.
    pub async fn recv(self) -> Result<Value, CdpError> {
        self.rx.await.map_err(|_| CdpError::Closed)
    }
}

impl PageSession {
    /// Subscribe to the next occurrence of `method` on this page.
    pub fn subscribe(&self, method: &str) -> EventSubscription {
        let (tx, rx) = oneshot::channel();
        let mut subscribers = self.subscribers.lock();
        let waiters = subscribers.entry(method.to_string()).or_default();
        waiters.retain(|tx| !tx.is_closed());
        waiters.push(tx);

        EventSubscription { rx }
    }

    /// Accept or dismiss the currently open native dialog.
    pub async fn handle_dialog(&self, accept: bool) -> Result<(), CdpError> {
        self.call(
            "Page.handleJavaScriptDialog",
            Some(json!({"accept": accept})),
        )
        .await?;
        debug!("Handled dialog (accept: {})", accept);
        Ok(())
    }
}
