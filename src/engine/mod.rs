//! Python session backends.

mod installer;
mod python;

pub use installer::*;
pub use python::*;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ReplResult;

/// Outcome of importing a module into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    Failed(String),
}

/// Trait for the persistent code execution session.
#[async_trait]
pub trait CodeEngine: Send + Sync {
    /// Executes code in the session and returns the result payload.
    async fn execute(&self, code: &str) -> ReplResult<Value>;

    /// Clears the session namespace and reseeds it.
    async fn reset(&self) -> ReplResult<()>;

    /// Returns the session variables as `name -> repr(value)`.
    async fn variables(&self) -> ReplResult<BTreeMap<String, String>>;

    /// Imports a module into the session namespace.
    async fn import_module(&self, module: &str) -> ReplResult<ImportOutcome>;

    /// Terminates the session worker, if any.
    async fn shutdown(&self);
}
