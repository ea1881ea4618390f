//! Wire protocol types: JSON-RPC 2.0 framing and MCP payloads.

pub mod jsonrpc;
pub mod mcp;
