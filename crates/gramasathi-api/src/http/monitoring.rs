//! Banner and liveness probe.

use axum::Json;

/// Plain-text banner.
pub async fn banner() -> &'static str {
    "GramaSathi Backend API is running"
}

/// Liveness probe.
pub async fn liveness_probe() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_probe() {
        let response = liveness_probe().await;
        assert_eq!(response.0["status"], "ok");
    }
}
