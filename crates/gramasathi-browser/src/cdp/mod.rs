//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chrome via WebSocket and speaks the CDP JSON-RPC protocol.
//! Commands are correlated by request id; events are routed to the page
//! session they belong to and fanned out to one-shot subscribers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let context_id = client.create_browser_context().await?;
//! let page = client.new_page_in_context(&context_id).await?;
//! page.navigate("https://example.com").await?;
//! let pdf = page.print_to_pdf(&PdfOptions::a4()).await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::{EventSubscription, PageSession};
