//! The list_variables tool.

use serde_json::json;

use crate::engine::CodeEngine;
use crate::protocol::mcp::CallToolResult;

use super::json_result;

/// Lists session variables as `name -> repr(value)`.
///
/// Takes no arguments; an empty or absent arguments object is accepted.
pub async fn list_variables(engine: &dyn CodeEngine) -> CallToolResult {
    match engine.variables().await {
        Ok(variables) => json_result(&json!({ "variables": variables })),
        Err(e) => CallToolResult::error(e.message),
    }
}
