use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_version_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "HeadlessChrome/126.0.0.0",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0",
            "V8-Version": "12.6",
            "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
        })))
        .mount(&server)
        .await;

    let version = CdpClient::version(&format!("{}/", server.uri())).await.unwrap();
    assert_eq!(version.protocol, "1.3");
    assert!(version.ws_url.ends_with("/browser/abc"));
}

#[tokio::test]
async fn test_version_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = CdpClient::version(&server.uri()).await.unwrap_err();
    assert!(matches!(err, CdpError::Unreachable(_)));
}

#[tokio::test]
async fn test_connect_rejects_malformed_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = CdpClient::connect(&server.uri()).await;
    assert!(matches!(result, Err(CdpError::Unreachable(_))));
}

#[tokio::test]
async fn test_connect_handshake_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Browser": "HeadlessChrome/126.0.0.0",
            "webSocketDebuggerUrl": "ws://127.0.0.1:1/devtools/browser/gone"
        })))
        .mount(&server)
        .await;

    let result = CdpClient::connect(&server.uri()).await;
    match result {
        Err(CdpError::Handshake(msg)) => assert!(msg.contains("127.0.0.1:1")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[tokio::test]
async fn test_connect_unreachable_endpoint() {
    let result = CdpClient::connect("http://127.0.0.1:1").await;
    match result {
        Err(CdpError::Unreachable(msg)) => assert!(msg.contains("127.0.0.1:1")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("connect should fail"),
    }
}

#[test]
fn test_required_str() {
    let result = serde_json::json!({"targetId": "T1", "count": 3});
    assert_eq!(required_str(&result, "targetId").unwrap(), "T1");
    assert!(matches!(
        required_str(&result, "count"),
        Err(CdpError::Malformed(msg)) if msg == "missing count"
    ));
}
