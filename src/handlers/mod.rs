//! Tool handlers for the MCP Python REPL.

mod execute;
mod packages;
mod variables;

pub use execute::*;
pub use packages::*;
pub use variables::*;

use serde_json::{json, Value};

use crate::protocol::mcp::{CallToolResult, Tool};

/// Wraps a JSON payload as a text tool result.
pub fn json_result(value: &Value) -> CallToolResult {
    CallToolResult::text(value.to_string())
}

/// The tool declarations this server advertises.
pub fn tool_declarations() -> Vec<Tool> {
    vec![
        Tool {
            name: "execute_python".to_string(),
            description: "Execute Python code and return the output. Variables persist between executions."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "Python code to execute",
                    },
                    "reset": {
                        "type": "boolean",
                        "description": "Reset the Python session (clear all variables)",
                        "default": false
                    }
                },
                "required": ["code"],
            }),
        },
        Tool {
            name: "list_variables".to_string(),
            description: "List all variables in the current session".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
            }),
        },
        Tool {
            name: "install_package".to_string(),
            description: "Install a Python package using uv".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "package": {
                        "type": "string",
                        "description": "Package name to install (e.g., 'pandas')",
                    }
                },
                "required": ["package"],
            }),
        },
    ]
}
