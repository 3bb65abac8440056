#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use fakelist::{
    DispatchTable, FakeListService, Host, InstalledPlugin, MemoryDispatchTable, MemorySource,
    PermissionSet, ServerIdentity, StaticInventory, Text,
};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub const REAL_PERMISSION: &str = "fakepluginslist.real";
pub const RELOAD_PERMISSION: &str = "fakepluginslist.reload";

/// An enabled service wired to an in-memory host.
pub struct Fixture {
    pub table: MemoryDispatchTable,
    pub source: MemorySource,
    pub service: FakeListService,
}

impl Fixture {
    pub fn enable(config: Value) -> Self {
        Self::enable_on(MemoryDispatchTable::new(), config)
    }

    /// Enable against a table that may already hold host commands.
    pub fn enable_on(table: MemoryDispatchTable, config: Value) -> Self {
        let source = MemorySource::new(config);
        let shared: Arc<dyn DispatchTable> = Arc::new(table.clone());
        let service = FakeListService::enable(
            source.clone(),
            Host::new(Ok(shared), Arc::new(real_inventory())),
        );
        Self {
            table,
            source,
            service,
        }
    }

    /// Dispatch through the host table, failing when the label is unbound.
    pub fn dispatch(&self, label: &str, caller: &PermissionSet, args: &[&str]) -> Result<Text> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        match self.table.dispatch(label, caller, &args) {
            Some(text) => Ok(text),
            None => bail!("/{label} is not bound; table has {:?}", self.table.labels()),
        }
    }

    pub fn plain(&self, label: &str, caller: &PermissionSet, args: &[&str]) -> Result<String> {
        Ok(self.dispatch(label, caller, args)?.to_plain())
    }
}

pub fn real_inventory() -> StaticInventory {
    StaticInventory::new(
        ServerIdentity {
            name: "Paper".to_string(),
            version: "1.21.4-R0.1".to_string(),
            api_version: "1.21.4-R0.1-SNAPSHOT".to_string(),
        },
        vec![
            InstalledPlugin {
                name: "LuckPerms".to_string(),
                enabled: true,
                version: "5.4.102".to_string(),
            },
            InstalledPlugin {
                name: "FakePluginsList".to_string(),
                enabled: true,
                version: "1.0.0".to_string(),
            },
            InstalledPlugin {
                name: "Broken".to_string(),
                enabled: false,
                version: String::new(),
            },
        ],
    )
}

pub fn player() -> PermissionSet {
    PermissionSet::new("steve")
}

pub fn staff() -> PermissionSet {
    PermissionSet::new("alex")
        .grant(REAL_PERMISSION)
        .grant(RELOAD_PERMISSION)
}

pub fn operator() -> PermissionSet {
    PermissionSet::operator("console")
}

pub fn write_json(value: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to allocate temp file")?;
    write!(file, "{value}")?;
    file.flush()?;
    Ok(file)
}

pub fn fakelist_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fakelist"))
}

/// Run a command and return its output without judging the exit status.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}
