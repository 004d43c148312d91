//! Element lookup and clicks.
//!
//! Elements are addressed by runtime object ids; unlike DOM node ids they
//! survive later `DOM.getDocument` calls.

use serde_json::json;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::BoxModel;

use super::core::PageSession;

/// CDP's generic server error, returned e.g. for elements without layout.
const SERVER_ERROR: i64 = -32000;

impl PageSession {
    /// First element matching `selector`, if any.
    pub async fn query_selector_object(&self, selector: &str) -> Result<Option<String>, CdpError> {
        let expression = format!("document.querySelector({})", serde_json::to_string(selector)?);
        let object = self.evaluate_handle(&expression).await?;
        if object.is_null() {
            return Ok(None);
        }
        Ok(object.object_id)
    }

    /// Every element matching `selector`, in document order.
    pub async fn query_selector_all_objects(&self, selector: &str) -> Result<Vec<String>, CdpError> {
        let list = format!("document.querySelectorAll({})", serde_json::to_string(selector)?);
        let count = self
            .evaluate(&format!("{}.length", list))
            .await?
            .as_u64()
            .unwrap_or(0);

        let mut ids = Vec::with_capacity(count as usize);
        for index in 0..count {
            let object = self.evaluate_handle(&format!("{}[{}]", list, index)).await?;
            ids.extend(object.object_id);
        }
        Ok(ids)
    }

    pub async fn focus_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("DOM.focus", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }

    /// Scroll the element into view and click the center of its content box.
    pub async fn click_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call(
            "DOM.scrollIntoViewIfNeeded",
            Some(json!({"objectId": object_id})),
        )
        .await?;

        let not_visible = || CdpError::NoSuchElement("element is not visible".to_string());
        let result = self
            .call("DOM.getBoxModel", Some(json!({"objectId": object_id})))
            .await
            .map_err(|e| match e {
                CdpError::Protocol { code: SERVER_ERROR, .. } => not_visible(),
                other => other,
            })?;
        let model: BoxModel = serde_json::from_value(result["model"].clone())?;
        let center = model.center().ok_or_else(not_visible)?;

        self.click_at(center).await
    }
}
