//! Error types and JSON-RPC error mapping.

use thiserror::Error;

use crate::protocol::jsonrpc::RpcError;

/// Error codes surfaced over JSON-RPC.
///
/// The reserved JSON-RPC 2.0 codes come first; the remainder are
/// server-defined codes in the -32000..-32099 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerNotInitialized,
    InterpreterUnavailable,
    ExecutionTimeout,
}

impl ErrorCode {
    /// Returns the JSON-RPC integer code.
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ServerNotInitialized => -32002,
            ErrorCode::InterpreterUnavailable => -32000,
            ErrorCode::ExecutionTimeout => -32001,
        }
    }

    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "ParseError",
            ErrorCode::InvalidRequest => "InvalidRequest",
            ErrorCode::MethodNotFound => "MethodNotFound",
            ErrorCode::InvalidParams => "InvalidParams",
            ErrorCode::InternalError => "InternalError",
            ErrorCode::ServerNotInitialized => "ServerNotInitialized",
            ErrorCode::InterpreterUnavailable => "InterpreterUnavailable",
            ErrorCode::ExecutionTimeout => "ExecutionTimeout",
        }
    }

    /// Returns the default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Failed to parse the request as JSON.",
            ErrorCode::InvalidRequest => "The request is not a valid JSON-RPC 2.0 message.",
            ErrorCode::MethodNotFound => "The requested method does not exist.",
            ErrorCode::InvalidParams => "The request parameters are invalid.",
            ErrorCode::InternalError => "The server encountered an internal error.",
            ErrorCode::ServerNotInitialized => "The server has not been initialized.",
            ErrorCode::InterpreterUnavailable => "The Python worker is unavailable.",
            ErrorCode::ExecutionTimeout => "Execution timed out and the session was discarded.",
        }
    }
}

/// REPL server error with code and message.
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ReplError {
    pub code: ErrorCode,
    pub message: String,
}

impl ReplError {
    /// Creates a new error with the given code and default message.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.default_message().to_string(),
            code,
        }
    }

    /// Creates a new error with a custom message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Converts the error into a JSON-RPC error object.
    pub fn to_rpc_error(&self) -> RpcError {
        RpcError {
            code: self.code.code(),
            message: self.message.clone(),
            data: None,
        }
    }
}

impl From<std::io::Error> for ReplError {
    fn from(err: std::io::Error) -> Self {
        ReplError::with_message(ErrorCode::InterpreterUnavailable, err.to_string())
    }
}

/// Result type alias for server operations.
pub type ReplResult<T> = Result<T, ReplError>;
