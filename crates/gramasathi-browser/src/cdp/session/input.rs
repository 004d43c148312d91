//! Synthetic mouse and keyboard input.

use std::time::Duration;

use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{KeyInput, MouseInput};

use super::core::PageSession;

impl PageSession {
    /// Left-click at viewport coordinates.
    pub async fn click_at(&self, at: (f64, f64)) -> Result<(), CdpError> {
        for event in [MouseInput::press(at), MouseInput::release(at)] {
            self.call("Input.dispatchMouseEvent", Some(serde_json::to_value(event)?))
                .await?;
        }
        debug!("Clicked at {:?}", at);
        Ok(())
    }

    /// Type into the focused element one key press per character, pausing
    /// `delay` between characters.
    ///
    /// Every character produces `keydown`/`keypress`/`input`/`keyup`, which is
    /// what framework-bound listeners react to.
    pub async fn type_text_with_delay(&self, text: &str, delay: Duration) -> Result<(), CdpError> {
        let mut buf = [0u8; 4];
        for (i, ch) in text.chars().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let key: &str = ch.encode_utf8(&mut buf);
            for event in [KeyInput::down(key), KeyInput::up(key)] {
                self.call("Input.dispatchKeyEvent", Some(serde_json::to_value(event)?))
                    .await?;
            }
        }

        debug!("Typed {} characters", text.chars().count());
        Ok(())
    }
}
