//! Python worker subprocess backend.
//!
//! The session lives in a spawned interpreter running an embedded harness
//! script. The harness owns the namespace and answers one JSON object per
//! line on its stdout; the worker's original stdout fd is re-pointed at
//! stderr by the harness so executed code cannot corrupt the channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ErrorCode, ReplError, ReplResult};

use super::{CodeEngine, ImportOutcome};

/// The embedded worker script.
const HARNESS_SOURCE: &str = include_str!("harness.py");

/// Persistent Python session backed by a worker subprocess.
///
/// The worker is spawned lazily on first use and respawned after a crash or
/// timeout, giving the next call a fresh session.
pub struct PythonEngine {
    session_id: Uuid,
    python_bin: PathBuf,
    workdir: Option<PathBuf>,
    preload_pandas: bool,
    startup_timeout: Duration,
    exec_timeout: Option<Duration>,
    worker: Mutex<Option<Worker>>,
}

/// Handles to a live worker process.
struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Request sent to the harness, one JSON object per line.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum HarnessRequest<'a> {
    Exec { code: &'a str },
    Vars,
    Import { module: &'a str },
    Reset,
}

/// Reply from the harness.
#[derive(Debug, Deserialize)]
struct HarnessReply {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Readiness event emitted by the harness after seeding the namespace.
#[derive(Debug, Deserialize)]
struct ReadyEvent {
    event: String,
    python: String,
    #[serde(default)]
    pandas: Option<String>,
}

/// Variables payload returned by the `vars` op.
#[derive(Debug, Deserialize)]
struct VarsPayload {
    variables: BTreeMap<String, String>,
}

/// Import payload returned by the `import` op.
#[derive(Debug, Deserialize)]
struct ImportPayload {
    imported: bool,
    #[serde(default)]
    error: Option<String>,
}

impl PythonEngine {
    /// Creates an engine from the server configuration. No worker is spawned
    /// until the first call.
    pub fn new(config: &Config) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            python_bin: config.python_bin.clone(),
            workdir: config.workdir.clone(),
            preload_pandas: config.preload_pandas,
            startup_timeout: config.startup_timeout,
            exec_timeout: config.exec_timeout,
            worker: Mutex::new(None),
        }
    }

    /// Spawns a worker and waits for its readiness handshake.
    async fn spawn(&self) -> ReplResult<Worker> {
        let mut command = Command::new(&self.python_bin);
        command
            .arg("-u")
            .arg("-c")
            .arg(HARNESS_SOURCE)
            .env("PYREPL_PRELOAD", if self.preload_pandas { "pandas" } else { "" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            ReplError::with_message(
                ErrorCode::InterpreterUnavailable,
                format!("failed to spawn {}: {}", self.python_bin.display(), e),
            )
        })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            ReplError::with_message(ErrorCode::InterpreterUnavailable, "worker stdin not captured")
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ReplError::with_message(ErrorCode::InterpreterUnavailable, "worker stdout not captured")
        })?;

        let mut worker = Worker {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        let ready = self.read_ready(&mut worker).await?;
        info!(
            session = %self.session_id,
            python = %ready.python,
            pandas = ready.pandas.as_deref().unwrap_or("not loaded"),
            "python worker ready"
        );

        Ok(worker)
    }

    /// Reads and validates the readiness event, bounded by the startup timeout.
    async fn read_ready(&self, worker: &mut Worker) -> ReplResult<ReadyEvent> {
        let mut line = String::new();
        let read = tokio::time::timeout(self.startup_timeout, worker.stdout.read_line(&mut line))
            .await
            .map_err(|_| {
                ReplError::with_message(
                    ErrorCode::InterpreterUnavailable,
                    "worker did not become ready before the startup timeout",
                )
            })??;
        if read == 0 {
            return Err(ReplError::with_message(
                ErrorCode::InterpreterUnavailable,
                "worker exited during startup",
            ));
        }

        let ready: ReadyEvent = serde_json::from_str(line.trim()).map_err(|e| {
            ReplError::with_message(
                ErrorCode::InterpreterUnavailable,
                format!("invalid readiness event from worker: {}", e),
            )
        })?;
        if ready.event != "ready" {
            return Err(ReplError::with_message(
                ErrorCode::InterpreterUnavailable,
                format!("unexpected event from worker: {}", ready.event),
            ));
        }
        Ok(ready)
    }

    /// Writes one request line and reads one reply line.
    async fn roundtrip(
        &self,
        worker: &mut Worker,
        request: &HarnessRequest<'_>,
        timeout: Option<Duration>,
    ) -> ReplResult<HarnessReply> {
        let mut line = serde_json::to_string(request)
            .map_err(|e| ReplError::with_message(ErrorCode::InternalError, e.to_string()))?;
        line.push('\n');
        worker.stdin.write_all(line.as_bytes()).await?;
        worker.stdin.flush().await?;

        let mut reply_line = String::new();
        let read = match timeout {
            Some(limit) => tokio::time::timeout(limit, worker.stdout.read_line(&mut reply_line))
                .await
                .map_err(|_| ReplError::new(ErrorCode::ExecutionTimeout))??,
            None => worker.stdout.read_line(&mut reply_line).await?,
        };
        if read == 0 {
            return Err(ReplError::with_message(
                ErrorCode::InterpreterUnavailable,
                "worker exited unexpectedly; the session was discarded",
            ));
        }

        serde_json::from_str(reply_line.trim())
            .map_err(|e| ReplError::with_message(ErrorCode::InternalError, e.to_string()))
    }

    /// Sends a request to the worker, spawning one if needed. Any failure
    /// discards the worker so the next call starts a fresh session.
    async fn call(
        &self,
        request: HarnessRequest<'_>,
        timeout: Option<Duration>,
    ) -> ReplResult<Value> {
        let mut guard = self.worker.lock().await;
        if guard.is_none() {
            *guard = Some(self.spawn().await?);
        }
        let worker = guard
            .as_mut()
            .ok_or_else(|| ReplError::new(ErrorCode::InterpreterUnavailable))?;

        match self.roundtrip(worker, &request, timeout).await {
            Ok(reply) => {
                if reply.ok {
                    Ok(reply.value)
                } else {
                    Err(ReplError::with_message(
                        ErrorCode::InternalError,
                        reply.error.unwrap_or_else(|| "worker protocol error".to_string()),
                    ))
                }
            }
            Err(e) => {
                warn!(session = %self.session_id, error = %e, "discarding python worker");
                if let Some(mut dead) = guard.take() {
                    let _ = dead.child.start_kill();
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl CodeEngine for PythonEngine {
    async fn execute(&self, code: &str) -> ReplResult<Value> {
        debug!(session = %self.session_id, bytes = code.len(), "executing code");
        self.call(HarnessRequest::Exec { code }, self.exec_timeout).await
    }

    async fn reset(&self) -> ReplResult<()> {
        self.call(HarnessRequest::Reset, None).await?;
        info!(session = %self.session_id, "session reset");
        Ok(())
    }

    async fn variables(&self) -> ReplResult<BTreeMap<String, String>> {
        let value = self.call(HarnessRequest::Vars, None).await?;
        let payload: VarsPayload = serde_json::from_value(value)
            .map_err(|e| ReplError::with_message(ErrorCode::InternalError, e.to_string()))?;
        Ok(payload.variables)
    }

    async fn import_module(&self, module: &str) -> ReplResult<ImportOutcome> {
        let value = self.call(HarnessRequest::Import { module }, None).await?;
        let payload: ImportPayload = serde_json::from_value(value)
            .map_err(|e| ReplError::with_message(ErrorCode::InternalError, e.to_string()))?;
        if payload.imported {
            Ok(ImportOutcome::Imported)
        } else {
            Ok(ImportOutcome::Failed(
                payload.error.unwrap_or_else(|| "import failed".to_string()),
            ))
        }
    }

    async fn shutdown(&self) {
        let mut guard = self.worker.lock().await;
        if let Some(mut worker) = guard.take() {
            debug!(session = %self.session_id, "shutting down python worker");
            let _ = worker.child.kill().await;
        }
    }
}
