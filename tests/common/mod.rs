//! Common test utilities.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf, WriteHalf};

use python_repl_rs::engine::{
    CodeEngine, ImportOutcome, InstallOutcome, PackageInstaller,
};
use python_repl_rs::error::{ErrorCode, ReplError, ReplResult};
use python_repl_rs::{Config, ReplServer, ReplServerBuilder};

/// In-memory engine that records calls and echoes executed code.
pub struct FakeEngine {
    pub executed: Mutex<Vec<String>>,
    pub imported: Mutex<Vec<String>>,
    pub vars: Mutex<BTreeMap<String, String>>,
    pub resets: AtomicUsize,
    pub fail_next: AtomicBool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            imported: Mutex::new(Vec::new()),
            vars: Mutex::new(BTreeMap::new()),
            resets: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn set_var(&self, name: &str, repr: &str) {
        self.vars.lock().unwrap().insert(name.to_string(), repr.to_string());
    }
}

#[async_trait]
impl CodeEngine for FakeEngine {
    async fn execute(&self, code: &str) -> ReplResult<Value> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ReplError::with_message(
                ErrorCode::InterpreterUnavailable,
                "worker exited unexpectedly; the session was discarded",
            ));
        }
        self.executed.lock().unwrap().push(code.to_string());
        Ok(json!({ "result": format!("echo:{}", code) }))
    }

    async fn reset(&self) -> ReplResult<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.vars.lock().unwrap().clear();
        Ok(())
    }

    async fn variables(&self) -> ReplResult<BTreeMap<String, String>> {
        Ok(self.vars.lock().unwrap().clone())
    }

    async fn import_module(&self, module: &str) -> ReplResult<ImportOutcome> {
        if module == "brokenimport" {
            return Ok(ImportOutcome::Failed(
                "No module named 'brokenimport'".to_string(),
            ));
        }
        self.imported.lock().unwrap().push(module.to_string());
        Ok(ImportOutcome::Imported)
    }

    async fn shutdown(&self) {}
}

/// Installer that records requested packages and returns a canned outcome.
pub struct FakeInstaller {
    pub requested: Mutex<Vec<String>>,
    pub outcome: Mutex<InstallOutcome>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self {
            requested: Mutex::new(Vec::new()),
            outcome: Mutex::new(InstallOutcome::Installed),
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.outcome.lock().unwrap() = InstallOutcome::Failed(message.to_string());
    }
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn install(&self, package: &str) -> ReplResult<InstallOutcome> {
        self.requested.lock().unwrap().push(package.to_string());
        Ok(self.outcome.lock().unwrap().clone())
    }
}

/// Client connection to a server running over an in-memory pipe.
pub struct TestConn {
    reader: BufReader<ReadHalf<DuplexStream>>,
    writer: WriteHalf<DuplexStream>,
    next_id: i64,
}

impl TestConn {
    /// Spawns the server on a duplex pipe and returns the client end.
    pub fn start(server: ReplServer) -> Self {
        let (client_end, server_end) = tokio::io::duplex(64 * 1024);
        let (server_reader, server_writer) = tokio::io::split(server_end);
        tokio::spawn(async move {
            server.serve(server_reader, server_writer).await.unwrap();
        });

        let (reader, writer) = tokio::io::split(client_end);
        Self {
            reader: BufReader::new(reader),
            writer,
            next_id: 0,
        }
    }

    /// Sends a raw line and returns the next response line parsed as JSON.
    pub async fn send_raw(&mut self, line: &str) -> Value {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
        self.recv().await
    }

    /// Reads the next response line.
    pub async fn recv(&mut self) -> Value {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await.unwrap();
        assert!(read > 0, "server closed the connection");
        serde_json::from_str(line.trim()).unwrap()
    }

    /// Sends a request and returns its response.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let message = json!({
            "jsonrpc": "2.0",
            "id": self.next_id,
            "method": method,
            "params": params,
        });
        let response = self.send_raw(&message.to_string()).await;
        assert_eq!(response["id"], json!(self.next_id));
        response
    }

    /// Sends a notification (no response expected).
    pub async fn notify(&mut self, method: &str) {
        let message = json!({ "jsonrpc": "2.0", "method": method });
        self.writer
            .write_all(format!("{}\n", message).as_bytes())
            .await
            .unwrap();
        self.writer.flush().await.unwrap();
    }

    /// Performs the initialize handshake.
    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "test-client", "version": "0.0.0" },
                }),
            )
            .await;
        self.notify("notifications/initialized").await;
        response
    }

    /// Calls a tool and returns the call result object.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        let response = self
            .request(
                "tools/call",
                json!({ "name": name, "arguments": arguments }),
            )
            .await;
        assert!(
            response.get("error").is_none(),
            "unexpected protocol error: {}",
            response
        );
        response["result"].clone()
    }
}

/// Starts a server with fake backends.
pub fn start_fake() -> (TestConn, Arc<FakeEngine>, Arc<FakeInstaller>) {
    let engine = Arc::new(FakeEngine::new());
    let installer = Arc::new(FakeInstaller::new());
    let server = ReplServerBuilder::new()
        .engine(engine.clone())
        .installer(installer.clone())
        .build();
    (TestConn::start(server), engine, installer)
}

/// Starts a server with the real Python engine (no pandas preload).
pub fn start_python() -> TestConn {
    let config = Config {
        preload_pandas: false,
        ..Config::default()
    };
    let server = ReplServerBuilder::new().config(config).build();
    TestConn::start(server)
}

/// Extracts the text of the first content block of a tool result.
pub fn result_text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().expect("text content")
}

/// Parses the text of the first content block as JSON.
pub fn result_json(result: &Value) -> Value {
    serde_json::from_str(result_text(result)).expect("json payload")
}

/// Returns whether the tool result is flagged as an error.
pub fn is_tool_error(result: &Value) -> bool {
    result["isError"].as_bool().unwrap_or(false)
}
