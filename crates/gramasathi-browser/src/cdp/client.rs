//! Browser-level DevTools client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{CdpEvent, CdpRequest, Incoming, VersionInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Per-session event routes; the key is the CDP `sessionId`.
type EventRoutes = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpEvent>>>>;

/// Upper bound on any single command round trip.
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// The browser socket plus reply correlation, shared by the client and
/// every page session attached through it.
pub(crate) struct Transport {
    sink: tokio::sync::Mutex<WsSink>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>,
    next_id: AtomicU64,
}

impl Transport {
    fn new(sink: WsSink) -> Self {
        Self {
            sink: tokio::sync::Mutex::new(sink),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Send one command and wait for its reply.
    pub(crate) async fn command(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let frame = serde_json::to_string(&CdpRequest {
            id,
            method,
            params,
            session_id,
        })?;
        trace!("CDP send: {}", frame);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sent = self.sink.lock().await.send(Message::Text(frame.into())).await;
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(CdpError::Closed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::TimedOut(format!("{} got no reply", method)))
            }
        }
    }

    fn resolve(&self, id: u64, outcome: Result<Value, CdpError>) {
        let waiter = self.pending.lock().remove(&id);
        match waiter {
            Some(tx) => {
                let _ = tx.send(outcome);
            }
            None => trace!("Reply {} has no waiter", id),
        }
    }

    /// Fail every in-flight command with [`CdpError::Closed`].
    fn fail_pending(&self) {
        let waiters: Vec<_> = self.pending.lock().drain().map(|(_, tx)| tx).collect();
        for tx in waiters {
            let _ = tx.send(Err(CdpError::Closed));
        }
    }
}

/// Connection to one Chrome instance.
///
/// Owns target and browser-context management; page-level work goes through
/// the [`PageSession`]s it attaches.
pub struct CdpClient {
    ws_url: String,
    transport: Arc<Transport>,
    routes: EventRoutes,
    reader: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Discover the browser socket behind `endpoint` (e.g. `http://127.0.0.1:9222`)
    /// and connect to it.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let version = Self::version(endpoint).await?;
        debug!("Found {} at {}", version.product, endpoint);

        let (stream, _) = tokio_tungstenite::connect_async(&version.ws_url)
            .await
            .map_err(|e| CdpError::Handshake(format!("{}: {}", version.ws_url, e)))?;
        let (sink, source) = stream.split();

        let transport = Arc::new(Transport::new(sink));
        let routes: EventRoutes = Arc::new(RwLock::new(HashMap::new()));
        let reader = tokio::spawn(Self::read_frames(source, transport.clone(), routes.clone()));

        debug!("CDP client connected to {}", version.ws_url);
        Ok(Self {
            ws_url: version.ws_url,
            transport,
            routes,
            reader,
        })
    }

    /// Fetch `/json/version` from the debugging endpoint.
    pub async fn version(endpoint: &str) -> Result<VersionInfo, CdpError> {
        let url = format!("{}/json/version", endpoint.trim_end_matches('/'));
        let unreachable = |e: reqwest::Error| CdpError::Unreachable(format!("{}: {}", endpoint, e));

        reqwest::get(&url)
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(unreachable)?
            .json()
            .await
            .map_err(unreachable)
    }

    async fn read_frames(mut source: WsSource, transport: Arc<Transport>, routes: EventRoutes) {
        while let Some(frame) = source.next().await {
            let text = match frame {
                Ok(Message::Text(text)) => text,
                Ok(Message::Close(_)) => {
                    debug!("Browser socket closed");
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    error!("Browser socket error: {}", e);
                    break;
                }
            };
            trace!("CDP recv: {}", text);

            match Incoming::parse(&text) {
                Ok(Incoming::Reply { id, outcome }) => transport.resolve(id, outcome),
                Ok(Incoming::Event(event)) => {
                    let Some(session_id) = event.session_id.clone() else {
                        continue;
                    };
                    if let Some(route) = routes.read().await.get(&session_id) {
                        let _ = route.send(event);
                    }
                }
                Ok(Incoming::Unknown) => {}
                Err(e) => warn!("Dropping unparsable CDP frame: {}", e),
            }
        }

        transport.fail_pending();
        routes.write().await.clear();
    }

    /// Send a browser-level command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.command(method, params, None).await
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Create an isolated browser context with its own cookies and storage.
    pub async fn create_browser_context(&self) -> Result<String, CdpError> {
        let result = self
            .call(
                "Target.createBrowserContext",
                Some(json!({"disposeOnDetach": true})),
            )
            .await?;
        let context_id = required_str(&result, "browserContextId")?;
        debug!("Created browser context {}", context_id);
        Ok(context_id)
    }

    /// Dispose a browser context and every page in it.
    pub async fn dispose_browser_context(&self, context_id: &str) -> Result<(), CdpError> {
        self.call(
            "Target.disposeBrowserContext",
            Some(json!({"browserContextId": context_id})),
        )
        .await?;
        debug!("Disposed browser context {}", context_id);
        Ok(())
    }

    /// Open `about:blank` inside `context_id` and attach a session to it.
    pub async fn new_page_in_context(&self, context_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.createTarget",
                Some(json!({"url": "about:blank", "browserContextId": context_id})),
            )
            .await?;
        let target_id = required_str(&result, "targetId")?;

        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;
        let session_id = required_str(&result, "sessionId")?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.routes.write().await.insert(session_id.clone(), events_tx);

        let session = PageSession::new(target_id, session_id, self.transport.clone(), events_rx);
        session.enable_domains().await?;
        debug!("Attached page {} in context {}", session.target_id(), context_id);
        Ok(session)
    }

    /// Stop routing events to a session.
    pub async fn forget_session(&self, session_id: &str) {
        self.routes.write().await.remove(session_id);
    }

    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn required_str(result: &Value, field: &str) -> Result<String, CdpError> {
    result[field]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CdpError::Malformed(format!("missing {}", field)))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
