//! Server configuration.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Server name reported during MCP initialization.
pub const SERVER_NAME: &str = "python-repl";

/// Server version reported during MCP initialization.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Default Python interpreter used for the session worker.
pub const DEFAULT_PYTHON_BIN: &str = "python3";

/// Default package manager binary.
pub const DEFAULT_UV_BIN: &str = "uv";

/// Default worker startup handshake timeout in seconds.
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 30;

/// Command-line arguments for the server.
#[derive(Parser, Debug, Clone)]
#[command(name = "python-repl-rs")]
#[command(about = "MCP Python REPL server in Rust")]
#[command(version)]
pub struct Args {
    /// Python interpreter to run the session worker with.
    #[arg(long, default_value = DEFAULT_PYTHON_BIN)]
    pub python: PathBuf,

    /// Package manager binary used by install_package.
    #[arg(long, default_value = DEFAULT_UV_BIN)]
    pub uv: PathBuf,

    /// Working directory for the session worker.
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Skip preloading pandas into the session namespace.
    #[arg(long)]
    pub no_preload: bool,

    /// Seconds to wait for the worker's readiness handshake.
    #[arg(long, default_value_t = DEFAULT_STARTUP_TIMEOUT_SECS)]
    pub startup_timeout_secs: u64,

    /// Kill executions running longer than this many seconds (off by default).
    #[arg(long)]
    pub exec_timeout_secs: Option<u64>,

    /// Enable debug logging.
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Enable silent mode (minimal logging).
    #[arg(long, short = 's')]
    pub silent: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            python: PathBuf::from(DEFAULT_PYTHON_BIN),
            uv: PathBuf::from(DEFAULT_UV_BIN),
            workdir: None,
            no_preload: false,
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
            exec_timeout_secs: None,
            debug: false,
            silent: false,
        }
    }
}

/// Server configuration derived from command-line arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Python interpreter for the session worker.
    pub python_bin: PathBuf,
    /// Package manager binary.
    pub uv_bin: PathBuf,
    /// Working directory for the session worker.
    pub workdir: Option<PathBuf>,
    /// Preload pandas (as `pd`) into the session namespace.
    pub preload_pandas: bool,
    /// Worker readiness handshake timeout.
    pub startup_timeout: Duration,
    /// Per-execution timeout; `None` lets executions run unbounded.
    pub exec_timeout: Option<Duration>,
    /// Enable debug logging.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            python_bin: PathBuf::from(DEFAULT_PYTHON_BIN),
            uv_bin: PathBuf::from(DEFAULT_UV_BIN),
            workdir: None,
            preload_pandas: true,
            startup_timeout: Duration::from_secs(DEFAULT_STARTUP_TIMEOUT_SECS),
            exec_timeout: None,
            debug: false,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            python_bin: args.python,
            uv_bin: args.uv,
            workdir: args.workdir,
            preload_pandas: !args.no_preload,
            startup_timeout: Duration::from_secs(args.startup_timeout_secs),
            exec_timeout: args.exec_timeout_secs.map(Duration::from_secs),
            debug: args.debug,
        }
    }
}
