//! Script evaluation in the page's main world.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::RemoteObject;

use super::core::PageSession;

impl PageSession {
    /// Evaluate `expression`, awaiting a returned promise, and return the
    /// JSON value it produces.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let reply = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;
        Ok(thrown(&reply)?["result"]["value"].clone())
    }

    /// Evaluate `expression` and keep the result as a remote handle.
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject, CdpError> {
        let reply = self
            .call(
                "Runtime.evaluate",
                Some(json!({"expression": expression, "returnByValue": false})),
            )
            .await?;
        Ok(serde_json::from_value(thrown(&reply)?["result"].clone())?)
    }

    /// Call `function` with `this` bound to the object behind `object_id`.
    /// `args` are passed by value.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Option<Vec<Value>>,
    ) -> Result<Value, CdpError> {
        let arguments: Vec<Value> = args
            .unwrap_or_default()
            .into_iter()
            .map(|value| json!({"value": value}))
            .collect();

        let reply = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "arguments": arguments,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;
        Ok(thrown(&reply)?["result"]["value"].clone())
    }
}

/// Turn a reply carrying `exceptionDetails` into [`CdpError::Script`],
/// preferring the thrown error's description over the generic "Uncaught".
fn thrown(reply: &Value) -> Result<&Value, CdpError> {
    let Some(details) = reply.get("exceptionDetails") else {
        return Ok(reply);
    };
    let text = details["exception"]["description"]
        .as_str()
        .or_else(|| details["text"].as_str())
        .unwrap_or("unknown exception");
    Err(CdpError::Script(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thrown_passes_clean_reply() {
        let reply = json!({"result": {"type": "number", "value": 3}});
        assert_eq!(thrown(&reply).unwrap()["result"]["value"], 3);
    }

    #[test]
    fn test_thrown_prefers_description() {
        let reply = json!({
            "result": {"type": "object"},
            "exceptionDetails": {
                "text": "Uncaught",
                "exception": {"description": "TypeError: x is null"}
            }
        });
        match thrown(&reply) {
            Err(CdpError::Script(msg)) => assert_eq!(msg, "TypeError: x is null"),
            other => panic!("expected script error, got {:?}", other),
        }
    }

    #[test]
    fn test_thrown_falls_back_to_text() {
        let reply = json!({"exceptionDetails": {"text": "SyntaxError"}});
        assert!(matches!(thrown(&reply), Err(CdpError::Script(msg)) if msg == "SyntaxError"));
    }
}
