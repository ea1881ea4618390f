//! JSON-RPC 2.0 message types.
//!
//! MCP transports exchange one JSON object per line. A message carrying an
//! `id` is a request and gets exactly one response; a message without one is
//! a notification and gets none.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version string required in every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request id: number, string, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(i64),
    String(String),
    Null,
}

/// An incoming message: request when `id` is present, notification otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Id>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    /// Returns whether this message is a notification.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// An outgoing response carrying either a result or an error.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    /// Creates a success response.
    pub fn success(id: Id, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Creates an error response.
    pub fn failure(id: Id, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_with_id_is_not_a_notification() {
        let req: Request = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "ping"
        }))
        .unwrap();
        assert!(!req.is_notification());
        assert_eq!(req.id, Some(Id::Number(1)));
    }

    #[test]
    fn request_without_id_is_a_notification() {
        let req: Request = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn string_ids_round_trip() {
        let req: Request = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": "abc",
            "method": "ping"
        }))
        .unwrap();
        let resp = Response::success(req.id.unwrap(), json!({}));
        let encoded = serde_json::to_value(&resp).unwrap();
        assert_eq!(encoded["id"], json!("abc"));
        assert_eq!(encoded["jsonrpc"], json!("2.0"));
        assert!(encoded.get("error").is_none());
    }

    #[test]
    fn failure_omits_result() {
        let resp = Response::failure(
            Id::Null,
            RpcError {
                code: -32601,
                message: "Method not found".to_string(),
                data: None,
            },
        );
        let encoded = serde_json::to_value(&resp).unwrap();
        assert!(encoded.get("result").is_none());
        assert_eq!(encoded["error"]["code"], json!(-32601));
    }
}
