//! In-process host: dispatch table, permission-set caller and static inventory.

use crate::error::FakeListError;
use crate::host::{
    Caller, DispatchTable, HandlerRef, InstalledPlugin, Inventory, ServerIdentity,
};
use crate::text::Text;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const WILDCARD: &str = "*";

#[derive(Clone, Default)]
/// Label -> handler map shared between the host and the registry.
///
/// Clones are handles onto the same table.
pub struct MemoryDispatchTable {
    entries: Arc<RwLock<BTreeMap<String, HandlerRef>>>,
}

impl MemoryDispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a handler that the host itself owns (e.g. the stock `/plugins`).
    pub fn insert_host_command(&self, label: &str, handler: HandlerRef) {
        self.entries.write().insert(label.to_lowercase(), handler);
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.read().contains_key(&label.to_lowercase())
    }

    /// Host-side resolution: lowercase the label, look it up, run it.
    ///
    /// The table lock is released before the handler runs so handlers may
    /// mutate the table (reload does).
    pub fn dispatch(&self, label: &str, caller: &dyn Caller, args: &[String]) -> Option<Text> {
        let handler = self.find_binding(label)?;
        Some(handler.execute(caller, args))
    }
}

impl DispatchTable for MemoryDispatchTable {
    fn find_binding(&self, label: &str) -> Option<HandlerRef> {
        self.entries.read().get(&label.to_lowercase()).cloned()
    }

    fn install(&self, label: &str, handler: HandlerRef) -> Result<(), FakeListError> {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return Err(FakeListError::InstallRejected {
                label,
                reason: "empty label".to_string(),
            });
        }
        self.entries.write().insert(label, handler);
        Ok(())
    }

    fn remove(&self, label: &str) -> Option<HandlerRef> {
        self.entries.write().remove(&label.to_lowercase())
    }
}

#[derive(Clone, Debug, Default)]
/// Caller whose permissions are an explicit set; `*` grants everything.
pub struct PermissionSet {
    name: String,
    granted: BTreeSet<String>,
}

impl PermissionSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            granted: BTreeSet::new(),
        }
    }

    pub fn grant(mut self, permission: impl Into<String>) -> Self {
        self.granted.insert(permission.into());
        self
    }

    pub fn operator(name: impl Into<String>) -> Self {
        Self::new(name).grant(WILDCARD)
    }
}

impl Caller for PermissionSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.granted.contains(WILDCARD) || self.granted.contains(permission)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
/// Fixed inventory, typically read from a JSON file.
pub struct StaticInventory {
    #[serde(default)]
    pub server: ServerIdentity,
    #[serde(default)]
    pub plugins: Vec<InstalledPlugin>,
}

impl StaticInventory {
    pub fn new(server: ServerIdentity, plugins: Vec<InstalledPlugin>) -> Self {
        Self { server, plugins }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
    }
}

impl Inventory for StaticInventory {
    fn server(&self) -> ServerIdentity {
        self.server.clone()
    }

    fn plugins(&self) -> Vec<InstalledPlugin> {
        self.plugins
            .iter()
            .filter(|plugin| !plugin.name.trim().is_empty())
            .cloned()
            .collect()
    }
}
