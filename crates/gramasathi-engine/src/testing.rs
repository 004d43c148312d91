//! In-memory page and context provider for engine tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::{oneshot, Notify};

use crate::error::EngineError;
use crate::injector::group_locator;
use crate::page::{
    ContextProvider, ElementHandle, ElementInfo, FormPage, PageContext, PageSignal, SignalWatch,
};

/// What a click on an element does besides toggling it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ClickEffect {
    Nothing,
    Navigate,
    /// Navigates once the delay has passed; the click returns afterwards.
    NavigateAfter(Duration),
    /// Opens a native dialog; the click blocks until it is dismissed.
    Dialog(String),
    Fail(String),
    /// The click never returns.
    Hang,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeElement {
    pub info: ElementInfo,
    pub value: String,
    pub checked: bool,
    pub options: Vec<String>,
    pub on_click: ClickEffect,
    pub clicks: usize,
    pub typed_delay: Option<Duration>,
}

impl FakeElement {
    pub fn tag(tag: &str) -> Self {
        Self {
            info: ElementInfo {
                tag: tag.to_string(),
                ..Default::default()
            },
            value: String::new(),
            checked: false,
            options: Vec::new(),
            on_click: ClickEffect::Nothing,
            clicks: 0,
            typed_delay: None,
        }
    }

    pub fn input(input_type: &str) -> Self {
        let mut element = Self::tag("input");
        element.info.input_type = Some(input_type.to_string());
        element
    }

    pub fn id(mut self, id: &str) -> Self {
        self.info.id = Some(id.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.info.name = Some(name.to_string());
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.info.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click = effect;
        self
    }
}

#[derive(Default)]
struct FakeState {
    elements: Vec<FakeElement>,
    locators: HashMap<String, Vec<usize>>,
    navigations: Vec<String>,
    navigate_error: Option<String>,
    scan_error: bool,
    print_error: bool,
    prints: usize,
    dismissed: usize,
    watchers: Vec<(PageSignal, oneshot::Sender<Value>)>,
}

/// A static DOM whose locators are registered by exact string.
#[derive(Default)]
pub(crate) struct FakePage {
    state: Mutex<FakeState>,
    dialog_closed: Notify,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element reachable through `locators`, its `#id`, its
    /// `tag[name="…"]` and, for checkboxes and radios, its group locator.
    pub fn add(&self, locators: &[&str], element: FakeElement) -> usize {
        let mut state = self.state.lock();
        let index = state.elements.len();

        let mut keys: Vec<String> = locators.iter().map(|l| l.to_string()).collect();
        if let Some(id) = &element.info.id {
            keys.push(format!("#{}", id));
        }
        if let Some(name) = &element.info.name {
            keys.push(format!("{}[name=\"{}\"]", element.info.tag, name));
            let input_type = element.info.effective_type();
            if input_type == "checkbox" || input_type == "radio" {
                keys.push(group_locator(&input_type, name));
            }
        }
        for key in keys {
            let indices = state.locators.entry(key).or_default();
            if !indices.contains(&index) {
                indices.push(index);
            }
        }

        state.elements.push(element);
        index
    }

    pub fn element(&self, index: usize) -> FakeElement {
        self.state.lock().elements[index].clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn prints(&self) -> usize {
        self.state.lock().prints
    }

    pub fn dismissed(&self) -> usize {
        self.state.lock().dismissed
    }

    pub fn fail_navigation(&self, error: &str) {
        self.state.lock().navigate_error = Some(error.to_string());
    }

    pub fn fail_scan(&self) {
        self.state.lock().scan_error = true;
    }

    pub fn fail_print(&self) {
        self.state.lock().print_error = true;
    }

    fn index(handle: &ElementHandle) -> Result<usize, EngineError> {
        handle
            .as_str()
            .parse()
            .map_err(|_| EngineError::Page(format!("stale handle {}", handle.as_str())))
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> T,
    ) -> Result<T, EngineError> {
        let index = Self::index(handle)?;
        let mut state = self.state.lock();
        let element = state
            .elements
            .get_mut(index)
            .ok_or_else(|| EngineError::Page(format!("no element {}", index)))?;
        Ok(f(element))
    }

    fn fire(&self, signal: PageSignal, payload: Value) {
        let mut state = self.state.lock();
        let (fired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut state.watchers)
            .into_iter()
            .partition(|(s, _)| *s == signal);
        state.watchers = kept;
        drop(state);

        for (_, tx) in fired {
            let _ = tx.send(payload.clone());
        }
    }
}

#[async_trait]
impl FormPage for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        match &state.navigate_error {
            Some(error) => Err(EngineError::Navigation(format!("{}: {}", url, error))),
            None => Ok(()),
        }
    }

    async fn scan_controls(&self) -> Result<Vec<ElementInfo>, EngineError> {
        let state = self.state.lock();
        if state.scan_error {
            return Err(EngineError::Page("scan script threw".to_string()));
        }
        Ok(state
            .elements
            .iter()
            .filter(|e| {
                matches!(e.info.tag.as_str(), "input" | "textarea" | "select")
                    || (e.info.tag == "button" && e.info.effective_type() == "submit")
            })
            .map(|e| ElementInfo {
                value: Some(e.value.clone()),
                ..e.info.clone()
            })
            .collect())
    }

    async fn wait_for(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>, EngineError> {
        let found = self
            .state
            .lock()
            .locators
            .get(locator)
            .and_then(|indices| indices.first().copied());
        match found {
            Some(index) => Ok(Some(ElementHandle::new(index.to_string()))),
            None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }

    async fn query_all(&self, locator: &str) -> Result<Vec<ElementHandle>, EngineError> {
        Ok(self
            .state
            .lock()
            .locators
            .get(locator)
            .map(|indices| {
                indices
                    .iter()
                    .map(|i| ElementHandle::new(i.to_string()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn inspect(&self, element: &ElementHandle) -> Result<ElementInfo, EngineError> {
        self.with_element(element, |e| ElementInfo {
            value: Some(e.value.clone()),
            ..e.info.clone()
        })
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), EngineError> {
        self.with_element(element, |e| e.value.clear())
    }

    async fn type_text(
        &self,
        element: &ElementHandle,
        text: &str,
        delay: Duration,
    ) -> Result<(), EngineError> {
        self.with_element(element, |e| {
            e.value.push_str(text);
            e.typed_delay = Some(delay);
        })
    }

    async fn select_option(&self, element: &ElementHandle, value: &str) -> Result<bool, EngineError> {
        self.with_element(element, |e| {
            if e.options.iter().any(|o| o == value) {
                e.value = value.to_string();
                true
            } else {
                false
            }
        })
    }

    async fn is_checked(&self, element: &ElementHandle) -> Result<bool, EngineError> {
        self.with_element(element, |e| e.checked)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), EngineError> {
        let effect = self.with_element(element, |e| {
            e.clicks += 1;
            match e.info.effective_type().as_str() {
                "checkbox" => e.checked = !e.checked,
                "radio" => e.checked = true,
                _ => {}
            }
            e.on_click.clone()
        })?;

        match effect {
            ClickEffect::Nothing => Ok(()),
            ClickEffect::Navigate => {
                self.fire(PageSignal::Navigation, json!({"timestamp": 1.0}));
                Ok(())
            }
            ClickEffect::NavigateAfter(delay) => {
                tokio::time::sleep(delay).await;
                self.fire(PageSignal::Navigation, json!({"timestamp": 1.0}));
                Ok(())
            }
            ClickEffect::Dialog(message) => {
                self.fire(PageSignal::Dialog, json!({"message": message, "type": "confirm"}));
                self.dialog_closed.notified().await;
                Ok(())
            }
            ClickEffect::Fail(error) => Err(EngineError::Page(error)),
            ClickEffect::Hang => std::future::pending().await,
        }
    }

    fn watch(&self, signal: PageSignal) -> SignalWatch {
        let (tx, rx) = oneshot::channel();
        self.state.lock().watchers.push((signal, tx));
        async move { rx.await.ok() }.boxed()
    }

    async fn dismiss_dialog(&self) -> Result<(), EngineError> {
        self.state.lock().dismissed += 1;
        self.dialog_closed.notify_one();
        Ok(())
    }

    async fn print_pdf(&self) -> Result<Vec<u8>, EngineError> {
        let mut state = self.state.lock();
        if state.print_error {
            return Err(EngineError::Page("printToPDF failed".to_string()));
        }
        state.prints += 1;
        Ok(format!("%PDF-1.4 fake #{}", state.prints).into_bytes())
    }
}

struct FakeContext {
    page: Arc<FakePage>,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl PageContext for FakeContext {
    fn page(&self) -> &dyn FormPage {
        self.page.as_ref()
    }

    async fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

type PageFactory = Box<dyn Fn() -> FakePage + Send + Sync>;

/// Builds a fresh [`FakePage`] for every acquired context.
pub(crate) struct FakeProvider {
    factory: PageFactory,
    pages: Mutex<Vec<Arc<FakePage>>>,
    released: Arc<AtomicUsize>,
    unavailable: bool,
}

impl FakeProvider {
    pub fn new(factory: impl Fn() -> FakePage + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            pages: Mutex::new(Vec::new()),
            released: Arc::new(AtomicUsize::new(0)),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(FakePage::new)
        }
    }

    pub fn pages(&self) -> Vec<Arc<FakePage>> {
        self.pages.lock().clone()
    }

    pub fn acquired(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextProvider for FakeProvider {
    async fn acquire(&self) -> Result<Box<dyn PageContext>, EngineError> {
        if self.unavailable {
            return Err(EngineError::ContextUnavailable("pool exhausted".to_string()));
        }
        let page = Arc::new((self.factory)());
        self.pages.lock().push(page.clone());
        Ok(Box::new(FakeContext {
            page,
            released: self.released.clone(),
        }))
    }
}
