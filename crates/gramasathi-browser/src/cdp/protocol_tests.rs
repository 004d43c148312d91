use super::*;

#[test]
fn test_request_omits_absent_fields() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate",
        params: Some(serde_json::json!({"url": "https://example.com"})),
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"method\":\"Page.navigate\""));
    assert!(!json.contains("sessionId"));

    let req = CdpRequest {
        id: 7,
        method: "Runtime.evaluate",
        params: None,
        session_id: Some("ABC"),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"sessionId\":\"ABC\""));
    assert!(!json.contains("params"));
}

#[test]
fn test_parse_reply() {
    match Incoming::parse(r#"{"id": 1, "result": {"frameId": "abc"}}"#).unwrap() {
        Incoming::Reply { id, outcome } => {
            assert_eq!(id, 1);
            assert_eq!(outcome.unwrap()["frameId"], "abc");
        }
        other => panic!("expected reply, got {:?}", other),
    }
}

#[test]
fn test_parse_reply_without_result_is_null() {
    match Incoming::parse(r#"{"id": 4}"#).unwrap() {
        Incoming::Reply { outcome, .. } => assert!(outcome.unwrap().is_null()),
        other => panic!("expected reply, got {:?}", other),
    }
}

#[test]
fn test_parse_error_reply() {
    let text = r#"{"id": 3, "error": {"code": -32000, "message": "Could not find node"}}"#;
    match Incoming::parse(text).unwrap() {
        Incoming::Reply { id: 3, outcome } => match outcome {
            Err(CdpError::Protocol { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "Could not find node");
            }
            other => panic!("expected protocol error, got {:?}", other),
        },
        other => panic!("expected reply, got {:?}", other),
    }
}

#[test]
fn test_parse_session_event() {
    let text = r#"{
        "method": "Page.javascriptDialogOpening",
        "params": {"url": "file:///form.html", "message": "Submitted!", "type": "alert"},
        "sessionId": "S1"
    }"#;
    match Incoming::parse(text).unwrap() {
        Incoming::Event(event) => {
            assert_eq!(event.method, EVENT_DIALOG_OPENING);
            assert_eq!(event.session_id.as_deref(), Some("S1"));
            assert_eq!(event.params["message"], "Submitted!");
        }
        other => panic!("expected event, got {:?}", other),
    }
}

#[test]
fn test_parse_unknown_and_garbage() {
    assert!(matches!(Incoming::parse("{}").unwrap(), Incoming::Unknown));
    assert!(matches!(Incoming::parse("not json"), Err(CdpError::Decode(_))));
}

#[test]
fn test_version_info_deserialize() {
    let json = r#"{
        "Browser": "HeadlessChrome/126.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/xyz"
    }"#;
    let version: VersionInfo = serde_json::from_str(json).unwrap();
    assert!(version.product.starts_with("HeadlessChrome"));
    assert!(version.ws_url.ends_with("/browser/xyz"));
}

#[test]
fn test_box_model_center() {
    let model = BoxModel {
        content: vec![10.0, 20.0, 30.0, 20.0, 30.0, 40.0, 10.0, 40.0],
    };
    assert_eq!(model.center(), Some((20.0, 30.0)));

    let flat = BoxModel {
        content: vec![1.0, 2.0],
    };
    assert_eq!(flat.center(), None);
}

#[test]
fn test_remote_object_null() {
    let null: RemoteObject =
        serde_json::from_str(r#"{"type": "object", "subtype": "null", "value": null}"#).unwrap();
    assert!(null.is_null());

    let node: RemoteObject = serde_json::from_str(
        r#"{"type": "object", "subtype": "node", "objectId": "{\"injectedScriptId\":1,\"id\":2}"}"#,
    )
    .unwrap();
    assert!(!node.is_null());
    assert!(node.object_id.is_some());
}

#[test]
fn test_input_payloads() {
    let press = serde_json::to_value(MouseInput::press((5.0, 6.0))).unwrap();
    assert_eq!(press["type"], "mousePressed");
    assert_eq!(press["button"], "left");
    assert_eq!(press["clickCount"], 1);

    let down = serde_json::to_value(KeyInput::down("a")).unwrap();
    assert_eq!(down["type"], "keyDown");
    assert_eq!(down["unmodifiedText"], "a");

    let up = serde_json::to_value(KeyInput::up("a")).unwrap();
    assert_eq!(up["type"], "keyUp");
    assert!(up.get("text").is_none());
}

#[test]
fn test_pdf_options_a4_serialize() {
    let value = serde_json::to_value(PdfOptions::a4()).unwrap();
    assert_eq!(value["paperWidth"], 8.27);
    assert_eq!(value["paperHeight"], 11.69);
    assert_eq!(value["printBackground"], true);
    assert_eq!(value["landscape"], false);
}
