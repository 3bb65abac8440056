//! Runtime configuration snapshot and the sources it is read from.
//!
//! The configuration format is owned by the host; this crate only sees a
//! `serde_json::Value`. [`RuntimeConfig::from_value`] resolves every key with
//! the defaults below and never fails. A [`ConfigSource`] is re-read on each
//! reload so the host can change the backing value between calls.

use crate::coerce::{value_as_bool, value_as_string_list, value_as_template};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_COMMAND: &str = "plugins";
pub const DEFAULT_SERVER_HEADER: &str = "&f? Server Plugins (&f%count%&f)";
pub const DEFAULT_PAPER_HEADER: &str = "&bPaper Plugins (&f%count%&f):";
pub const DEFAULT_BUKKIT_HEADER: &str = "&6Bukkit Plugins (&f%count%&f):";
pub const DEFAULT_REAL_LIST_PERMISSION: &str = "fakepluginslist.real";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Resolved configuration. Replaced wholesale on reload.
pub struct RuntimeConfig {
    /// Command names to expose; never empty, first entry is the primary command.
    pub commands: Vec<String>,
    pub server_header: String,
    pub paper_header: String,
    pub bukkit_header: String,
    /// Permission that unlocks the real data views. Empty disables them.
    pub real_list_permission: String,
    pub show_disabled: bool,
    pub random_order: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_value(&Value::Null)
    }
}

impl RuntimeConfig {
    pub fn from_value(raw: &Value) -> Self {
        let mut commands = value_as_string_list(raw.get("commands"), "commands");
        if commands.is_empty() {
            commands.push(DEFAULT_COMMAND.to_string());
        }
        let real_list_permission = value_as_template(
            raw.get("real_list_permission"),
            "real_list_permission",
            DEFAULT_REAL_LIST_PERMISSION,
        )
        .trim()
        .to_string();

        Self {
            commands,
            server_header: value_as_template(
                raw.get("server_header"),
                "server_header",
                DEFAULT_SERVER_HEADER,
            ),
            paper_header: value_as_template(
                raw.get("paper_header"),
                "paper_header",
                DEFAULT_PAPER_HEADER,
            ),
            bukkit_header: value_as_template(
                raw.get("bukkit_header"),
                "bukkit_header",
                DEFAULT_BUKKIT_HEADER,
            ),
            real_list_permission,
            show_disabled: value_as_bool(
                raw.get("show_disabled_plugins"),
                "show_disabled_plugins",
                true,
            ),
            random_order: value_as_bool(raw.get("random_order"), "random_order", true),
        }
    }

    /// Command used by click affordances in the list view.
    pub fn primary_command(&self) -> &str {
        self.commands
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_COMMAND)
    }
}

/// Where configuration values come from. Re-read on every reload.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<Value>;
}

/// JSON file on disk. A missing file means "all defaults".
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for JsonFileSource {
    fn load(&self) -> Result<Value> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Value::Null),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        serde_json::from_str(&data).with_context(|| format!("parsing {}", self.path.display()))
    }
}

/// Shared in-memory value. Clones see each other's updates.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    value: Arc<RwLock<Value>>,
}

impl MemorySource {
    pub fn new(value: Value) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }

    /// Replace the value returned by the next `load`.
    pub fn set(&self, value: Value) {
        *self.value.write() = value;
    }
}

impl ConfigSource for MemorySource {
    fn load(&self) -> Result<Value> {
        Ok(self.value.read().clone())
    }
}
