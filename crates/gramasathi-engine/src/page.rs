//! The page seam between the engine and a browser.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::Value;

use crate::error::EngineError;

/// Opaque reference to an element on a loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attributes of a form control, read at inspection time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ElementInfo {
    /// Lowercase tag name.
    pub tag: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub placeholder: Option<String>,
    /// The `value` attribute/property, for option matching in groups.
    pub value: Option<String>,
}

impl ElementInfo {
    /// Lowercase `type` attribute; `text` for inputs without one.
    pub fn effective_type(&self) -> String {
        match &self.input_type {
            Some(t) if !t.trim().is_empty() => t.trim().to_lowercase(),
            _ if self.tag == "input" => "text".to_string(),
            _ => String::new(),
        }
    }
}

/// Page-level signals the submission race listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSignal {
    /// A native alert/confirm/prompt opened.
    Dialog,
    /// The page finished loading a new document.
    Navigation,
}

/// Resolves with the signal's payload once it fires, or `None` if the page
/// went away first. Armed at creation; dropping it unsubscribes.
pub type SignalWatch = BoxFuture<'static, Option<Value>>;

/// A loaded document the engine can inspect and drive.
#[async_trait]
pub trait FormPage: Send + Sync {
    /// Load `url` and wait until the document is interactive.
    async fn navigate(&self, url: &str) -> Result<(), EngineError>;

    /// Every `input`, `textarea`, `select` and submit button, in document order.
    async fn scan_controls(&self) -> Result<Vec<ElementInfo>, EngineError>;

    /// Wait up to `timeout` for `locator` to match. `Ok(None)` when it never does.
    async fn wait_for(&self, locator: &str, timeout: Duration)
        -> Result<Option<ElementHandle>, EngineError>;

    /// All current matches of `locator`, in document order.
    async fn query_all(&self, locator: &str) -> Result<Vec<ElementHandle>, EngineError>;

    async fn inspect(&self, element: &ElementHandle) -> Result<ElementInfo, EngineError>;

    /// Empty the element's value and fire `input`.
    async fn clear(&self, element: &ElementHandle) -> Result<(), EngineError>;

    /// Focus the element and type `text` one keystroke at a time.
    async fn type_text(&self, element: &ElementHandle, text: &str, delay: Duration)
        -> Result<(), EngineError>;

    /// Select the option whose value equals `value`. `false` if none does.
    async fn select_option(&self, element: &ElementHandle, value: &str) -> Result<bool, EngineError>;

    async fn is_checked(&self, element: &ElementHandle) -> Result<bool, EngineError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), EngineError>;

    /// Start listening for `signal`.
    fn watch(&self, signal: PageSignal) -> SignalWatch;

    /// Dismiss the open native dialog.
    async fn dismiss_dialog(&self) -> Result<(), EngineError>;

    /// Render the current page as an A4 PDF.
    async fn print_pdf(&self) -> Result<Vec<u8>, EngineError>;
}

/// An isolated browsing context holding one page.
#[async_trait]
pub trait PageContext: Send + Sync {
    fn page(&self) -> &dyn FormPage;

    /// Tear the context down. Idempotent.
    async fn release(&self);
}

/// Hands out fresh isolated browsing contexts.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn PageContext>, EngineError>;
}
