//! Errors raised by the DevTools client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    /// Nothing answered `/json/version` on the debugging endpoint.
    #[error("DevTools endpoint unreachable: {0}")]
    Unreachable(String),

    /// The browser WebSocket could not be opened.
    #[error("DevTools handshake failed: {0}")]
    Handshake(String),

    #[error("DevTools transport error: {0}")]
    Transport(String),

    /// Chrome answered a command with an error object.
    #[error("DevTools command rejected ({code}): {message}")]
    Protocol { code: i64, message: String },

    #[error("Undecodable DevTools payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// A reply decoded but lacked a field the caller relies on.
    #[error("Malformed DevTools reply: {0}")]
    Malformed(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No element matches {0}")]
    NoSuchElement(String),

    #[error("Script threw: {0}")]
    Script(String),

    #[error("Timed out: {0}")]
    TimedOut(String),

    /// The socket closed while a command or event wait was outstanding.
    #[error("DevTools session closed")]
    Closed,
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::Transport(e.to_string())
    }
}

impl From<base64::DecodeError> for CdpError {
    fn from(e: base64::DecodeError) -> Self {
        CdpError::Malformed(format!("bad base64 payload: {}", e))
    }
}
