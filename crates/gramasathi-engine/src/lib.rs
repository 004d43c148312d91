//! # GramaSathi Engine
//!
//! Automates submission of third-party web forms on behalf of a stored user.
//!
//! A task runs as a strict sequence inside one isolated browsing context:
//!
//! 1. navigate to the form document,
//! 2. resolve semantic field names to locators ([`SelectorResolver`]),
//! 3. inject every user field with a widget-aware strategy ([`FieldInjector`]),
//! 4. capture a "before" snapshot ([`SnapshotCapturer`]),
//! 5. click submit and race navigation, dialog and a settle timer
//!    ([`SubmissionCoordinator`]),
//! 6. capture an "after" snapshot,
//!
//! all driven by the [`TaskOrchestrator`]. The browser is only reached through
//! the [`FormPage`] and [`ContextProvider`] traits; [`cdp_page`] implements
//! them on top of `gramasathi-browser`.

pub mod cdp_page;
pub mod error;
pub mod injector;
pub mod model;
pub mod orchestrator;
pub mod page;
pub mod resolver;
pub mod snapshot;
pub mod store;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

pub use cdp_page::{BrowserContextProvider, CdpFormPage};
pub use error::{EngineError, TaskError};
pub use injector::{group_locator, FieldInjector, WidgetKind};
pub use model::*;
pub use orchestrator::{EngineTimings, TaskOrchestrator, TaskRequest};
pub use page::{ContextProvider, ElementHandle, ElementInfo, FormPage, PageContext, PageSignal, SignalWatch};
pub use resolver::{FormRegistry, SelectorResolver};
pub use snapshot::{FileSnapshotSink, MemorySnapshotSink, SnapshotCapturer, SnapshotSink};
pub use store::{
    collections, new_id, now_timestamp, DocumentStore, FileDocumentStore, MemoryDocumentStore,
    StatusLog, StoreError,
};
pub use submission::SubmissionCoordinator;
