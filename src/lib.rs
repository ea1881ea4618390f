//! Python-repl-rs: MCP Python REPL server in Rust.
//!
//! This crate provides a Model Context Protocol server that exposes a
//! persistent Python session over stdio. It implements the `python-repl`
//! tool surface: executing code, listing session variables, and installing
//! packages with `uv`.
//!
//! # Example
//!
//! ```no_run
//! use python_repl_rs::{Config, ReplServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = ReplServer::new(Config::default());
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;

// Re-exports for convenience
pub use config::{Args, Config, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};
pub use engine::{CodeEngine, ImportOutcome, InstallOutcome, PackageInstaller, PythonEngine, UvInstaller};
pub use error::{ErrorCode, ReplError, ReplResult};
pub use server::{ReplServer, ReplServerBuilder};
