//! Python-repl-rs: MCP Python REPL server in Rust.
//!
//! Speaks the Model Context Protocol over stdio and executes Python code in
//! a persistent worker session.

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use python_repl_rs::{Args, Config, ReplServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug {
        Level::DEBUG
    } else if args.silent {
        Level::ERROR
    } else {
        Level::INFO
    };

    // stdout carries the protocol, so all logging goes to stderr.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Create configuration from arguments
    let config = Config::from(args);

    // Create and run the server
    let server = ReplServer::new(config);
    server.run().await
}
