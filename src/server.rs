//! Stdio server for the MCP Python REPL.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use crate::config::{Config, SERVER_NAME, SERVER_VERSION};
use crate::engine::{CodeEngine, PackageInstaller, PythonEngine, UvInstaller};
use crate::router::{handle_line, AppState};

/// MCP server owning the session engine and package installer.
pub struct ReplServer {
    config: Arc<Config>,
    engine: Arc<dyn CodeEngine>,
    installer: Arc<dyn PackageInstaller>,
}

impl ReplServer {
    /// Creates a server with the Python subprocess engine and uv installer.
    pub fn new(config: Config) -> Self {
        let engine: Arc<dyn CodeEngine> = Arc::new(PythonEngine::new(&config));
        let installer: Arc<dyn PackageInstaller> = Arc::new(UvInstaller::new(config.uv_bin.clone()));

        Self {
            config: Arc::new(config),
            engine,
            installer,
        }
    }

    /// Creates a server with custom backends.
    pub fn with_backends(
        config: Config,
        engine: Arc<dyn CodeEngine>,
        installer: Arc<dyn PackageInstaller>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            installer,
        }
    }

    /// Runs the server over stdio until the client disconnects.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            server = SERVER_NAME,
            version = SERVER_VERSION,
            python = %self.config.python_bin.display(),
            "serving MCP over stdio"
        );
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await?;
        Ok(())
    }

    /// Serves one connection over the given streams until EOF.
    ///
    /// Requests are answered in arrival order; one line in, at most one line
    /// out. The engine is shut down when the input stream ends.
    pub async fn serve<R, W>(self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let state = AppState::new(
            self.config.clone(),
            self.engine.clone(),
            self.installer.clone(),
        );

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(response) = handle_line(&state, line).await {
                let mut encoded =
                    serde_json::to_string(&response).map_err(std::io::Error::from)?;
                encoded.push('\n');
                writer.write_all(encoded.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("input stream closed, shutting down");
        self.engine.shutdown().await;
        Ok(())
    }
}

/// Builder for creating a REPL server.
pub struct ReplServerBuilder {
    config: Config,
    engine: Option<Arc<dyn CodeEngine>>,
    installer: Option<Arc<dyn PackageInstaller>>,
}

impl ReplServerBuilder {
    /// Creates a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            engine: None,
            installer: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the Python interpreter for the session worker.
    pub fn python(mut self, python: impl Into<std::path::PathBuf>) -> Self {
        self.config.python_bin = python.into();
        self
    }

    /// Sets the session engine.
    pub fn engine(mut self, engine: Arc<dyn CodeEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Sets the package installer.
    pub fn installer(mut self, installer: Arc<dyn PackageInstaller>) -> Self {
        self.installer = Some(installer);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ReplServer {
        let engine = self
            .engine
            .unwrap_or_else(|| Arc::new(PythonEngine::new(&self.config)));
        let installer = self
            .installer
            .unwrap_or_else(|| Arc::new(UvInstaller::new(self.config.uv_bin.clone())));

        ReplServer::with_backends(self.config, engine, installer)
    }
}

impl Default for ReplServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
