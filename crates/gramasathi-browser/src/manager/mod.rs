//! Browser instance manager.
//!
//! Launches (or reuses) a Chrome with remote debugging enabled and hands out
//! isolated browser contexts, bounded by a semaphore.

mod manager_contexts;
mod manager_core;
mod manager_types;

pub use manager_contexts::ContextLease;
pub use manager_core::BrowserManager;
pub use manager_types::{BrowserError, BrowserManagerConfig};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
