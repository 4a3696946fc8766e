//! Request and response envelopes
//!
//! Pulls the user message out of the event shapes API gateways and test
//! harnesses send, and wraps results in the proxy-integration response shape.

use crate::error::RouterError;
use crate::models::ClassificationResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Extract the trimmed user message from a request event.
///
/// Accepts any of:
/// - `{"message": "hi"}`
/// - `{"body": {"message": "hi"}}`
/// - `{"body": "{\"message\":\"hi\"}"}`
///
/// Returns an empty string when no usable message is present.
pub fn extract_message(event: &Value) -> String {
    let Some(event) = event.as_object() else {
        return String::new();
    };

    if let Some(message) = event.get("message").and_then(Value::as_str) {
        return message.trim().to_string();
    }

    match event.get("body") {
        Some(Value::Object(body)) => message_field(body.get("message")),
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(body)) => message_field(body.get("message")),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

fn message_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|m| m.trim().to_string())
        .unwrap_or_default()
}

/// HTTP method of a gateway event, upper-cased; empty when absent
pub fn request_method(event: &Value) -> String {
    event
        .pointer("/requestContext/http/method")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .or_else(|| event.get("httpMethod").and_then(Value::as_str))
        .unwrap_or("")
        .to_uppercase()
}

pub fn is_preflight(event: &Value) -> bool {
    request_method(event) == "OPTIONS"
}

/// Body acknowledging a preflight request
pub fn preflight_body() -> Value {
    json!({ "ok": true })
}

/// Body describing a request that could not be classified
pub fn error_body(error: &RouterError) -> Value {
    json!({
        "reply": error.to_string(),
        "intent": error.intent_label(),
    })
}

//
// ================= Proxy Response =================
//

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_HEADERS: &str = "content-type";
pub const CORS_ALLOW_METHODS: &str = "OPTIONS,POST";

/// Response in the gateway proxy-integration shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded response body
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status_code: u16, body: &Value) -> Self {
        let headers = [
            ("Content-Type", "application/json"),
            ("Access-Control-Allow-Origin", CORS_ALLOW_ORIGIN),
            ("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS),
            ("Access-Control-Allow-Methods", CORS_ALLOW_METHODS),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    pub fn preflight() -> Self {
        Self::new(200, &preflight_body())
    }

    pub fn from_outcome(outcome: &crate::Result<ClassificationResult>) -> Self {
        match outcome {
            Ok(result) => Self::new(200, &json!(result)),
            Err(error) => Self::new(error.status_code().as_u16(), &error_body(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_message() {
        assert_eq!(extract_message(&json!({"message": "  hi there "})), "hi there");
    }

    #[test]
    fn test_body_object() {
        assert_eq!(extract_message(&json!({"body": {"message": "fees?"}})), "fees?");
    }

    #[test]
    fn test_body_json_string() {
        let event = json!({"body": "{\"message\":\"  enroll  \"}"});
        assert_eq!(extract_message(&event), "enroll");
    }

    #[test]
    fn test_unusable_shapes_are_empty() {
        let cases = vec![
            json!(null),
            json!("message"),
            json!({}),
            json!({"message": 42}),
            json!({"body": null}),
            json!({"body": "not json"}),
            json!({"body": "[1, 2]"}),
            json!({"body": {"message": null}}),
            json!({"body": {"text": "hi"}}),
            json!({"body": 7}),
        ];

        for event in cases {
            assert_eq!(extract_message(&event), "", "event: {event}");
        }
    }

    #[test]
    fn test_non_string_top_level_message_uses_body() {
        let event = json!({"message": 1, "body": {"message": "from body"}});
        assert_eq!(extract_message(&event), "from body");
    }

    #[test]
    fn test_request_method() {
        assert_eq!(
            request_method(&json!({"requestContext": {"http": {"method": "options"}}})),
            "OPTIONS"
        );
        assert_eq!(request_method(&json!({"httpMethod": "Post"})), "POST");
        assert_eq!(request_method(&json!({"message": "hi"})), "");
        assert!(is_preflight(&json!({"httpMethod": "OPTIONS"})));
    }

    #[test]
    fn test_gateway_response_shape() {
        let response = GatewayResponse::preflight();
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["headers"]["Access-Control-Allow-Methods"], "OPTIONS,POST");
        assert_eq!(json["headers"]["Content-Type"], "application/json");
        assert_eq!(json["body"], r#"{"ok":true}"#);
    }

    #[test]
    fn test_error_outcome() {
        let response = GatewayResponse::from_outcome(&Err(RouterError::MissingMessage));
        let body: Value = serde_json::from_str(&response.body).unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(body["intent"], "BadRequest");
        assert_eq!(body["reply"], "Missing 'message' in request.");
    }
}
