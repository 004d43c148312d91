//! [`FormPage`] and [`ContextProvider`] over a real Chrome via CDP.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use gramasathi_browser::cdp::{PdfOptions, EVENT_DIALOG_OPENING, EVENT_LOAD_FIRED};
use gramasathi_browser::{BrowserError, BrowserManager, ContextLease, PageSession};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::EngineError;
use crate::page::{
    ContextProvider, ElementHandle, ElementInfo, FormPage, PageContext, PageSignal, SignalWatch,
};

/// Upper bound for the initial document load.
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

const SCAN_CONTROLS: &str = r#"
Array.from(document.querySelectorAll('input, textarea, select, button')).map(el => ({
    tag: el.tagName.toLowerCase(),
    type: el.tagName === 'BUTTON' ? el.type : el.getAttribute('type'),
    name: el.getAttribute('name'),
    id: el.id || null,
    placeholder: el.getAttribute('placeholder'),
    value: el.value ?? null,
}))
"#;

const INSPECT: &str = r#"function() {
    return {
        tag: this.tagName.toLowerCase(),
        type: this.tagName === 'BUTTON' ? this.type : this.getAttribute('type'),
        name: this.getAttribute('name'),
        id: this.id || null,
        placeholder: this.getAttribute('placeholder'),
        value: this.value ?? this.getAttribute('value'),
    };
}"#;

const CLEAR: &str = r#"function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
}"#;

const SELECT_OPTION: &str = r#"function(value) {
    const option = Array.from(this.options || []).find(o => o.value === value);
    if (!option) return false;
    this.value = value;
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
    return true;
}"#;

const IS_CHECKED: &str = "function() { return !!this.checked; }";

/// A page inside one isolated browser context.
pub struct CdpFormPage {
    session: Arc<PageSession>,
    load_timeout: Duration,
}

impl CdpFormPage {
    pub fn new(session: Arc<PageSession>, load_timeout: Duration) -> Self {
        Self {
            session,
            load_timeout,
        }
    }

    pub fn session(&self) -> &Arc<PageSession> {
        &self.session
    }

    async fn call_on(
        &self,
        element: &ElementHandle,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<Value, EngineError> {
        Ok(self
            .session
            .call_function_on(element.as_str(), function, args)
            .await?)
    }
}

#[async_trait]
impl FormPage for CdpFormPage {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        self.session
            .navigate(url, self.load_timeout)
            .await
            .map(|frame| debug!("Loaded {} in frame {}", url, frame))
            .map_err(|e| EngineError::Navigation(e.to_string()))
    }

    async fn scan_controls(&self) -> Result<Vec<ElementInfo>, EngineError> {
        let controls = self.session.evaluate(SCAN_CONTROLS).await?;
        serde_json::from_value(controls)
            .map_err(|e| EngineError::Page(format!("unexpected scan result: {}", e)))
    }

    async fn wait_for(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>, EngineError> {
        Ok(self
            .session
            .wait_for_selector(locator, timeout)
            .await?
            .map(ElementHandle::new))
    }

    async fn query_all(&self, locator: &str) -> Result<Vec<ElementHandle>, EngineError> {
        Ok(self
            .session
            .query_selector_all_objects(locator)
            .await?
            .into_iter()
            .map(ElementHandle::new)
            .collect())
    }

    async fn inspect(&self, element: &ElementHandle) -> Result<ElementInfo, EngineError> {
        let info = self.call_on(element, INSPECT, None).await?;
        serde_json::from_value(info)
            .map_err(|e| EngineError::Page(format!("unexpected element info: {}", e)))
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), EngineError> {
        self.call_on(element, CLEAR, None).await?;
        Ok(())
    }

    async fn type_text(
        &self,
        element: &ElementHandle,
        text: &str,
        delay: Duration,
    ) -> Result<(), EngineError> {
        self.session.focus_object(element.as_str()).await?;
        self.session.type_text_with_delay(text, delay).await?;
        Ok(())
    }

    async fn select_option(&self, element: &ElementHandle, value: &str) -> Result<bool, EngineError> {
        let selected = self
            .call_on(element, SELECT_OPTION, Some(vec![json!(value)]))
            .await?;
        Ok(selected.as_bool().unwrap_or(false))
    }

    async fn is_checked(&self, element: &ElementHandle) -> Result<bool, EngineError> {
        let checked = self.call_on(element, IS_CHECKED, None).await?;
        Ok(checked.as_bool().unwrap_or(false))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), EngineError> {
        self.session.click_object(element.as_str()).await?;
        Ok(())
    }

    fn watch(&self, signal: PageSignal) -> SignalWatch {
        let method = match signal {
            PageSignal::Dialog => EVENT_DIALOG_OPENING,
            PageSignal::Navigation => EVENT_LOAD_FIRED,
        };
        let subscription = self.session.subscribe(method);
        async move { subscription.recv().await.ok() }.boxed()
    }

    async fn dismiss_dialog(&self) -> Result<(), EngineError> {
        self.session.handle_dialog(false).await?;
        Ok(())
    }

    async fn print_pdf(&self) -> Result<Vec<u8>, EngineError> {
        Ok(self.session.print_to_pdf(&PdfOptions::a4()).await?)
    }
}

/// A leased browser context and its page.
struct CdpContext {
    lease: ContextLease,
    page: CdpFormPage,
}

#[async_trait]
impl PageContext for CdpContext {
    fn page(&self) -> &dyn FormPage {
        &self.page
    }

    async fn release(&self) {
        self.lease.release().await;
    }
}

/// Leases isolated contexts from a shared [`BrowserManager`].
pub struct BrowserContextProvider {
    manager: Arc<BrowserManager>,
    load_timeout: Duration,
}

impl BrowserContextProvider {
    pub fn new(manager: Arc<BrowserManager>) -> Self {
        Self {
            manager,
            load_timeout: PAGE_LOAD_TIMEOUT,
        }
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn manager(&self) -> &Arc<BrowserManager> {
        &self.manager
    }
}

#[async_trait]
impl ContextProvider for BrowserContextProvider {
    async fn acquire(&self) -> Result<Box<dyn PageContext>, EngineError> {
        let lease = self.manager.acquire_context().await.map_err(|e| match e {
            BrowserError::ContextUnavailable(_)
            | BrowserError::ChromeNotFound
            | BrowserError::LaunchFailed(_)
            | BrowserError::Unreachable(_) => EngineError::ContextUnavailable(e.to_string()),
            other => EngineError::Browser(other),
        })?;
        debug!("Acquired browser context {}", lease.context_id());

        let page = CdpFormPage::new(lease.page().clone(), self.load_timeout);
        Ok(Box::new(CdpContext { lease, page }))
    }
}
