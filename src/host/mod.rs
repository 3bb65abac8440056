//! Adapter interfaces onto the host process.
//!
//! The host owns the dispatch table, the real plugin inventory and the notion
//! of a caller with permissions. This crate only reaches them through the
//! traits below; [`memory`] provides plain in-process implementations used by
//! the bundled binary and the tests.

pub mod memory;

use crate::error::FakeListError;
use crate::text::Text;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use memory::{MemoryDispatchTable, PermissionSet, StaticInventory};

/// Whoever invoked a command.
pub trait Caller {
    fn name(&self) -> &str;
    fn has_permission(&self, permission: &str) -> bool;
}

/// Something the host can invoke by label.
pub trait CommandHandler: Send + Sync {
    /// Label the handler was created for, as configured (not lowercased).
    fn label(&self) -> &str;
    /// Run the command. Always produces exactly one message.
    fn execute(&self, caller: &dyn Caller, args: &[String]) -> Text;
}

pub type HandlerRef = Arc<dyn CommandHandler>;

/// Host-owned mapping from command label to handler.
///
/// Methods take `&self`: the table is shared with the host's own resolution
/// path, so implementations synchronize internally. Every call must be visible
/// to the host's next lookup.
pub trait DispatchTable: Send + Sync {
    fn find_binding(&self, label: &str) -> Option<HandlerRef>;
    fn install(&self, label: &str, handler: HandlerRef) -> Result<(), FakeListError>;
    fn remove(&self, label: &str) -> Option<HandlerRef>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Identity shown in the version banner.
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
    pub api_version: String,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: "Paper".to_string(),
            version: "unknown".to_string(),
            api_version: "unknown".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// One real plugin as reported by the host.
pub struct InstalledPlugin {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub version: String,
}

fn default_enabled() -> bool {
    true
}

/// Read-only view of what is really installed.
pub trait Inventory: Send + Sync {
    fn server(&self) -> ServerIdentity;
    fn plugins(&self) -> Vec<InstalledPlugin>;

    /// Look a plugin up by exact name, then ignoring case.
    fn find(&self, name: &str) -> Option<InstalledPlugin> {
        let plugins = self.plugins();
        if let Some(exact) = plugins.iter().find(|p| p.name == name) {
            return Some(exact.clone());
        }
        plugins
            .into_iter()
            .find(|p| crate::catalog::names_match(&p.name, name))
    }
}
