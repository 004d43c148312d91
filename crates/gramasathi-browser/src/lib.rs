//! Browser control for GramaSathi.
//!
//! A pure Rust Chrome DevTools Protocol (CDP) client plus a pool of isolated
//! browser contexts, one per form automation task.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐    WebSocket     ┌──────────────────────────┐
//! │  BrowserManager  │ ◄──────────────► │  Chrome (headless)       │
//! │  ContextLease ×N │       CDP        │  browser context ×N      │
//! └──────────────────┘                  └──────────────────────────┘
//! ```
//!
//! Chrome is launched on demand with remote debugging enabled, or reused if
//! something is already listening on the configured debug port. Every task
//! gets its own `Target.createBrowserContext` context (separate cookies,
//! storage and page), so concurrent tasks never observe each other. The number
//! of live contexts is capped by a semaphore; acquisition waits a bounded time
//! and then fails instead of overloading the browser.

pub mod cdp;
pub mod manager;

pub use cdp::{CdpClient, CdpError, EventSubscription, PageSession};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig, ContextLease};
