//! Navigation and bounded waits.

use std::future::Future;
use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

/// Poll interval for readiness and selector waits.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Re-run `probe` until it yields a value or `timeout` elapses.
/// The probe always runs at least once.
async fn poll_until<T, F, Fut>(timeout: Duration, mut probe: F) -> Result<Option<T>, CdpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, CdpError>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(found) = probe().await? {
            return Ok(Some(found));
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

impl PageSession {
    /// Navigate and wait until the document is at least interactive.
    /// Returns the main frame id.
    pub async fn navigate(&self, url: &str, timeout: Duration) -> Result<String, CdpError> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(reason) = result["errorText"].as_str() {
            return Err(CdpError::Navigation {
                url: url.to_string(),
                reason: reason.to_string(),
            });
        }

        self.wait_for_load(timeout).await?;
        debug!("Navigated to {}", url);
        Ok(result["frameId"].as_str().unwrap_or("main").to_string())
    }

    /// Wait until `document.readyState` leaves `loading`.
    pub async fn wait_for_load(&self, timeout: Duration) -> Result<(), CdpError> {
        let ready = poll_until(timeout, move || async move {
            let state = self.evaluate("document.readyState").await?;
            Ok(matches!(state.as_str(), Some("interactive" | "complete")).then_some(()))
        })
        .await?;

        ready.ok_or_else(|| CdpError::TimedOut(format!("page not loaded after {:?}", timeout)))
    }

    /// Wait for `selector` to match; `Ok(None)` if it never does within `timeout`.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>, CdpError> {
        poll_until(timeout, move || self.query_selector_object(selector)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_found_after_retries() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let found = poll_until(Duration::from_secs(1), move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok((n == 2).then_some(n))
        })
        .await
        .unwrap();

        assert_eq!(found, Some(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_gives_up() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let start = tokio::time::Instant::now();
        let found: Option<()> = poll_until(Duration::from_millis(250), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        })
        .await
        .unwrap();

        assert!(found.is_none());
        assert!(start.elapsed() >= Duration::from_millis(250));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_poll_until_zero_timeout_probes_once() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let found: Option<()> = poll_until(Duration::ZERO, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        })
        .await
        .unwrap();
        assert!(found.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let result: Result<Option<()>, _> =
            poll_until(Duration::from_secs(1), || async { Err(CdpError::Closed) }).await;
        assert!(matches!(result, Err(CdpError::Closed)));
    }
}
