//! The install_package tool.

use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;
use tracing::info;

use crate::engine::{CodeEngine, ImportOutcome, InstallOutcome, PackageInstaller};
use crate::protocol::mcp::CallToolResult;

use super::json_result;

/// Returns whether a package name is safe to pass to the installer.
pub fn is_valid_package_name(package: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new("^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid pattern"));
    pattern.is_match(package)
}

/// Installs a package with uv and imports it into the session.
pub async fn install_package(
    engine: &dyn CodeEngine,
    installer: &dyn PackageInstaller,
    arguments: Option<&Map<String, Value>>,
) -> CallToolResult {
    let args = match arguments {
        Some(args) if !args.is_empty() => args,
        _ => return CallToolResult::error("Missing arguments"),
    };

    let package = match args.get("package").and_then(Value::as_str) {
        Some(package) if !package.is_empty() => package,
        _ => return CallToolResult::error("Missing package name"),
    };

    if !is_valid_package_name(package) {
        return json_result(&json!({
            "error": format!("Invalid package name: {}", package)
        }));
    }

    match installer.install(package).await {
        Ok(InstallOutcome::Installed) => {}
        Ok(InstallOutcome::Failed(message)) => {
            return json_result(&json!({ "error": message }));
        }
        Err(e) => return CallToolResult::error(e.message),
    }

    // Import the base module; extras like "package[extra]" are not importable.
    let module = package.split('[').next().unwrap_or(package);
    match engine.import_module(module).await {
        Ok(ImportOutcome::Imported) => {
            info!(package, "package installed and imported");
            json_result(&json!({
                "success": format!("Successfully installed and imported {}", package)
            }))
        }
        Ok(ImportOutcome::Failed(message)) => json_result(&json!({
            "error": format!("Package installed but import failed: {}", message)
        })),
        Err(e) => CallToolResult::error(e.message),
    }
}
