//! Request context extraction and handling.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ErrorCode, ReplError, ReplResult};
use crate::protocol::jsonrpc::{Id, Request};

/// Extracted request context for a single JSON-RPC request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request id assigned by the client.
    pub id: Id,
    /// Method name.
    pub method: String,
    /// Raw request parameters.
    pub params: Option<Value>,
    /// Time the request was received.
    pub received_at: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a request context from a decoded request.
    ///
    /// Fails with `InvalidRequest` when the message does not announce
    /// JSON-RPC 2.0.
    pub fn new(request: Request) -> ReplResult<Self> {
        if request.jsonrpc != crate::protocol::jsonrpc::JSONRPC_VERSION {
            return Err(ReplError::with_message(
                ErrorCode::InvalidRequest,
                format!("unsupported jsonrpc version: {:?}", request.jsonrpc),
            ));
        }

        Ok(Self {
            id: request.id.unwrap_or(Id::Null),
            method: request.method,
            params: request.params,
            received_at: Utc::now(),
        })
    }

    /// Deserializes the request parameters into a typed value.
    pub fn parse_params<T: DeserializeOwned>(&self) -> ReplResult<T> {
        let params = self.params.clone().unwrap_or(Value::Object(Default::default()));
        serde_json::from_value(params)
            .map_err(|e| ReplError::with_message(ErrorCode::InvalidParams, e.to_string()))
    }

    /// Milliseconds elapsed since the request was received.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.received_at).num_milliseconds()
    }
}
