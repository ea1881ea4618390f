//! The execute_python tool.

use serde_json::{Map, Value};
use tracing::debug;

use crate::engine::CodeEngine;
use crate::protocol::mcp::CallToolResult;

use super::json_result;

/// Message returned after a session reset.
pub const RESET_MESSAGE: &str = "Python session reset. All variables cleared.";

/// Executes code in the persistent session, or resets it.
///
/// The result is the execution payload serialized as JSON text: captured
/// output and errors, plus the value of the final expression. Execution
/// failures come back as an `{"error": ...}` payload rather than a tool
/// error, matching the wire behavior clients already depend on.
pub async fn execute_python(
    engine: &dyn CodeEngine,
    arguments: Option<&Map<String, Value>>,
) -> CallToolResult {
    let args = match arguments {
        Some(args) if !args.is_empty() => args,
        _ => return CallToolResult::error("Missing arguments"),
    };

    let code = match args.get("code").and_then(Value::as_str) {
        Some(code) if !code.is_empty() => code,
        _ => return CallToolResult::error("Missing code parameter"),
    };

    if args.get("reset").and_then(Value::as_bool).unwrap_or(false) {
        return match engine.reset().await {
            Ok(()) => CallToolResult::text(RESET_MESSAGE),
            Err(e) => CallToolResult::error(e.message),
        };
    }

    match engine.execute(code).await {
        Ok(payload) => {
            debug!("execution finished");
            json_result(&payload)
        }
        Err(e) => CallToolResult::error(e.message),
    }
}
