//! Page session: command dispatch and event fan-out for one attached target.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::cdp::client::Transport;
use crate::cdp::error::CdpError;
use crate::cdp::protocol::CdpEvent;

/// One-shot waiters keyed by CDP event method.
pub(super) type Subscribers = Arc<Mutex<HashMap<String, Vec<oneshot::Sender<Value>>>>>;

/// A flattened session attached to a single page target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    transport: Arc<Transport>,
    pub(super) subscribers: Subscribers,
    fan_out: tokio::task::JoinHandle<()>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Arc<Transport>,
        events: mpsc::UnboundedReceiver<CdpEvent>,
    ) -> Self {
        let subscribers: Subscribers = Arc::new(Mutex::new(HashMap::new()));
        let fan_out = tokio::spawn(Self::fan_out(events, subscribers.clone()));

        Self {
            target_id,
            session_id,
            transport,
            subscribers,
            fan_out,
        }
    }

    /// Hand each event to every waiter registered for its method.
    async fn fan_out(mut events: mpsc::UnboundedReceiver<CdpEvent>, subscribers: Subscribers) {
        while let Some(event) = events.recv().await {
            trace!("CDP event: {}", event.method);
            let waiters = subscribers.lock().remove(&event.method);
            for tx in waiters.into_iter().flatten() {
                let _ = tx.send(event.params.clone());
            }
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a command scoped to this page.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .command(method, params, Some(&self.session_id))
            .await
    }

    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        for domain in ["Page.enable", "DOM.enable", "Runtime.enable"] {
            self.call(domain, None).await?;
        }
        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.fan_out.abort();
    }
}
