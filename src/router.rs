//! Request routing for the MCP Python REPL server.

use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Config, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
use crate::context::RequestContext;
use crate::engine::{CodeEngine, PackageInstaller};
use crate::error::{ErrorCode, ReplError, ReplResult};
use crate::handlers;
use crate::protocol::jsonrpc::{Id, Request, Response};
use crate::protocol::mcp::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    ListToolsResult, ServerCapabilities, ToolsCapability,
};

/// Application state shared between handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<dyn CodeEngine>,
    pub installer: Arc<dyn PackageInstaller>,
    /// Client implementation recorded during initialization.
    client: Arc<RwLock<Option<Implementation>>>,
    /// Whether an initialize request has been received.
    initialized: Arc<AtomicBool>,
}

impl AppState {
    /// Creates the shared state for one served connection.
    pub fn new(
        config: Arc<Config>,
        engine: Arc<dyn CodeEngine>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        Self {
            config,
            engine,
            installer,
            client: Arc::new(RwLock::new(None)),
            initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the client info recorded at initialization.
    pub fn client_info(&self) -> Option<Implementation> {
        self.client.read().clone()
    }
}

/// Handles one raw input line. Returns the response to write, or `None` for
/// notifications.
pub async fn handle_line(state: &AppState, line: &str) -> Option<Response> {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "failed to parse request");
            let error = ReplError::with_message(ErrorCode::ParseError, e.to_string());
            return Some(Response::failure(Id::Null, error.to_rpc_error()));
        }
    };

    if request.is_notification() {
        handle_notification(state, &request);
        return None;
    }

    let id = request.id.clone().unwrap_or(Id::Null);
    let ctx = match RequestContext::new(request) {
        Ok(ctx) => ctx,
        Err(e) => return Some(Response::failure(id, e.to_rpc_error())),
    };

    let response = match dispatch(state, &ctx).await {
        Ok(result) => Response::success(ctx.id.clone(), result),
        Err(e) => {
            debug!(method = %ctx.method, code = e.code.as_str(), "request failed");
            Response::failure(ctx.id.clone(), e.to_rpc_error())
        }
    };
    debug!(method = %ctx.method, elapsed_ms = ctx.elapsed_ms(), "request handled");
    Some(response)
}

/// Handles an incoming notification. Notifications never get a response.
fn handle_notification(state: &AppState, request: &Request) {
    match request.method.as_str() {
        "notifications/initialized" => {
            let client = state.client_info();
            debug!(
                client = client.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown"),
                "client reported initialized"
            );
        }
        other => debug!(method = other, "ignoring notification"),
    }
}

/// Dispatches a request to its handler.
async fn dispatch(state: &AppState, ctx: &RequestContext) -> ReplResult<Value> {
    match ctx.method.as_str() {
        "initialize" => initialize(state, ctx),
        "ping" => Ok(json!({})),
        "tools/list" => {
            require_initialized(state)?;
            to_result(&ListToolsResult {
                tools: handlers::tool_declarations(),
            })
        }
        "tools/call" => {
            require_initialized(state)?;
            call_tool(state, ctx).await
        }
        _ => Err(ReplError::new(ErrorCode::MethodNotFound)),
    }
}

/// Handles the initialize request.
fn initialize(state: &AppState, ctx: &RequestContext) -> ReplResult<Value> {
    let params: InitializeParams = ctx.parse_params()?;

    if let Some(client) = &params.client_info {
        info!(name = %client.name, version = %client.version, "client connected");
    }
    if let Some(requested) = &params.protocol_version {
        if requested != PROTOCOL_VERSION {
            debug!(
                requested = %requested,
                supported = PROTOCOL_VERSION,
                "protocol version mismatch"
            );
        }
    }
    *state.client.write() = params.client_info;
    state.initialized.store(true, Ordering::SeqCst);

    to_result(&InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        },
        server_info: Implementation {
            name: SERVER_NAME.to_string(),
            version: SERVER_VERSION.to_string(),
        },
    })
}

/// Handles a tools/call request.
async fn call_tool(state: &AppState, ctx: &RequestContext) -> ReplResult<Value> {
    let params: CallToolParams = ctx.parse_params()?;
    let arguments = params.arguments.as_ref();

    info!(tool = %params.name, "tool call");
    let result = match params.name.as_str() {
        "execute_python" => handlers::execute_python(state.engine.as_ref(), arguments).await,
        "list_variables" => handlers::list_variables(state.engine.as_ref()).await,
        "install_package" => {
            handlers::install_package(state.engine.as_ref(), state.installer.as_ref(), arguments)
                .await
        }
        other => CallToolResult::error(format!("Unknown tool: {}", other)),
    };

    to_result(&result)
}

/// Rejects requests issued before initialization.
fn require_initialized(state: &AppState) -> ReplResult<()> {
    if state.initialized.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(ReplError::new(ErrorCode::ServerNotInitialized))
    }
}

/// Serializes a handler result into a JSON-RPC result value.
fn to_result<T: serde::Serialize>(value: &T) -> ReplResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ReplError::with_message(ErrorCode::InternalError, e.to_string()))
}
