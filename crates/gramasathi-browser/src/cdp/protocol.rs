//! Wire format of the DevTools protocol: outgoing commands, incoming
//! frames, and the handful of typed payloads the page session needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::CdpError;

/// Fired when the page's `load` event fires.
pub const EVENT_LOAD_FIRED: &str = "Page.loadEventFired";

/// Fired when a native `alert`/`confirm`/`prompt`/`beforeunload` dialog opens.
pub const EVENT_DIALOG_OPENING: &str = "Page.javascriptDialogOpening";

/// Outgoing command. `session_id` routes it to an attached page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdpRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

/// Every frame Chrome sends has this shape; which fields are set decides
/// whether it is a reply or an event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<RemoteError>,
    method: Option<String>,
    params: Option<Value>,
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    code: i64,
    message: String,
}

/// A pushed event, tagged with the session it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CdpEvent {
    pub method: String,
    pub params: Value,
    /// `None` for browser-level events.
    pub session_id: Option<String>,
}

/// A classified incoming frame.
#[derive(Debug)]
pub enum Incoming {
    Reply {
        id: u64,
        outcome: Result<Value, CdpError>,
    },
    Event(CdpEvent),
    Unknown,
}

impl Incoming {
    pub fn parse(text: &str) -> Result<Self, CdpError> {
        let frame: RawFrame = serde_json::from_str(text)?;

        if let Some(id) = frame.id {
            let outcome = match frame.error {
                Some(err) => Err(CdpError::Protocol {
                    code: err.code,
                    message: err.message,
                }),
                None => Ok(frame.result.unwrap_or(Value::Null)),
            };
            return Ok(Incoming::Reply { id, outcome });
        }

        Ok(match frame.method {
            Some(method) => Incoming::Event(CdpEvent {
                method,
                params: frame.params.unwrap_or(Value::Null),
                session_id: frame.session_id,
            }),
            None => Incoming::Unknown,
        })
    }
}

/// The part of `/json/version` used for discovery.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser")]
    pub product: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub ws_url: String,
}

/// `DOM.getBoxModel` result; only the content quad is used.
#[derive(Debug, Clone, Deserialize)]
pub struct BoxModel {
    pub content: Vec<f64>,
}

impl BoxModel {
    /// Center of the content quad, or `None` for a degenerate quad.
    pub fn center(&self) -> Option<(f64, f64)> {
        let q = self.content.get(..8)?;
        let x = (q[0] + q[2] + q[4] + q[6]) / 4.0;
        let y = (q[1] + q[3] + q[5] + q[7]) / 4.0;
        Some((x, y))
    }
}

/// Handle returned by `Runtime.evaluate` without `returnByValue`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: Option<String>,
    pub object_id: Option<String>,
}

impl RemoteObject {
    pub fn is_null(&self) -> bool {
        self.subtype.as_deref() == Some("null") || self.kind == "undefined"
    }
}

/// `Input.dispatchMouseEvent` params for a left-button event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseInput {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: f64,
    pub y: f64,
    pub button: &'static str,
    pub click_count: u32,
}

impl MouseInput {
    fn left(kind: &'static str, (x, y): (f64, f64)) -> Self {
        Self {
            kind,
            x,
            y,
            button: "left",
            click_count: 1,
        }
    }

    pub fn press(at: (f64, f64)) -> Self {
        Self::left("mousePressed", at)
    }

    pub fn release(at: (f64, f64)) -> Self {
        Self::left("mouseReleased", at)
    }
}

/// `Input.dispatchKeyEvent` params for one printable character.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInput<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmodified_text: Option<&'a str>,
}

impl<'a> KeyInput<'a> {
    /// Key down carrying the character, so `keypress` and `input` fire.
    pub fn down(key: &'a str) -> Self {
        Self {
            kind: "keyDown",
            key,
            text: Some(key),
            unmodified_text: Some(key),
        }
    }

    pub fn up(key: &'a str) -> Self {
        Self {
            kind: "keyUp",
            key,
            text: None,
            unmodified_text: None,
        }
    }
}

/// Options for `Page.printToPDF`. Paper sizes are in inches.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfOptions {
    pub landscape: bool,
    pub print_background: bool,
    pub scale: f64,
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl PdfOptions {
    /// Portrait A4 with backgrounds and 0.4in margins.
    pub fn a4() -> Self {
        Self {
            landscape: false,
            print_background: true,
            scale: 1.0,
            paper_width: 8.27,
            paper_height: 11.69,
            margin_top: 0.4,
            margin_bottom: 0.4,
            margin_left: 0.4,
            margin_right: 0.4,
        }
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
