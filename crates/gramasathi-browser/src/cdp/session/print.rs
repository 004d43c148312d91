//! Page rendering to PDF.

use base64::Engine;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::PdfOptions;

use super::core::PageSession;

impl PageSession {
    /// Render the current page to a PDF document.
    pub async fn print_to_pdf(&self, options: &PdfOptions) -> Result<Vec<u8>, CdpError> {
        let params = serde_json::to_value(options)?;
        let result = self.call("Page.printToPDF", Some(params)).await?;

        let data = result["data"]
            .as_str()
            .ok_or_else(|| CdpError::Malformed("printToPDF returned no data".to_string()))?;

        let bytes = base64::engine::general_purpose::STANDARD.decode(data)?;
        debug!("Printed page to PDF ({} bytes)", bytes.len());
        Ok(bytes)
    }
}
