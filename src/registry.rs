//! Command registration against the host dispatch table.
//!
//! The registry keeps its own bookkeeping of every name it bound and the
//! labels it installed for that name. Each configured name is published as
//! the bare label, the owning-namespace form and, for unqualified names, the
//! two conventional namespace aliases. Eviction on registration is
//! unconditional so the decoy replaces whatever the host had bound; removal on
//! unregistration only touches labels that still point at our own handler.

use crate::command::CommandKind;
use crate::error::FakeListError;
use crate::host::{DispatchTable, HandlerRef};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const OWNING_NAMESPACE: &str = "fakepluginslist";
pub const CONVENTIONAL_NAMESPACES: [&str; 2] = ["bukkit", "minecraft"];
const NAMESPACE_SEPARATOR: char = ':';

#[derive(Clone)]
/// One active registration and every label installed for it.
pub struct CommandBinding {
    pub name: String,
    pub kind: CommandKind,
    pub labels: Vec<String>,
    handler: HandlerRef,
}

impl CommandBinding {
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }
}

impl fmt::Debug for CommandBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

/// Labels a normalized name is published under.
pub fn binding_labels(normalized: &str) -> Vec<String> {
    let mut labels = vec![
        normalized.to_string(),
        format!("{OWNING_NAMESPACE}{NAMESPACE_SEPARATOR}{normalized}"),
    ];
    if !normalized.contains(NAMESPACE_SEPARATOR) {
        for namespace in CONVENTIONAL_NAMESPACES {
            labels.push(format!("{namespace}{NAMESPACE_SEPARATOR}{normalized}"));
        }
    }
    labels
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct CommandRegistry {
    table: Option<Arc<dyn DispatchTable>>,
    bindings: BTreeMap<String, CommandBinding>,
}

impl CommandRegistry {
    /// Attach to the host table. An unavailable table puts the registry in
    /// disabled mode: registration becomes a logged no-op.
    pub fn attach(table: Result<Arc<dyn DispatchTable>, FakeListError>) -> Self {
        let table = match table {
            Ok(table) => Some(table),
            Err(err) => {
                warn!("{err}; commands will not be registered");
                None
            }
        };
        Self {
            table,
            bindings: BTreeMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.table.is_some()
    }

    pub fn binding(&self, name: &str) -> Option<&CommandBinding> {
        self.bindings.get(&normalize(name))
    }

    /// Bookkept names in stable order.
    pub fn bound_names(&self) -> Vec<String> {
        self.bindings.keys().cloned().collect()
    }

    /// Register `names` in order; later duplicates replace earlier ones.
    ///
    /// Returns the bindings that were installed. Names the table rejects are
    /// logged and skipped with nothing left behind.
    pub fn register_all<F>(
        &mut self,
        names: &[String],
        kind: CommandKind,
        mut factory: F,
    ) -> Vec<CommandBinding>
    where
        F: FnMut(&str, CommandKind) -> HandlerRef,
    {
        let Some(table) = self.table.clone() else {
            if !names.is_empty() {
                warn!(
                    count = names.len(),
                    "dispatch table unavailable; commands were not registered"
                );
            }
            return Vec::new();
        };

        let mut registered = Vec::new();
        for name in names {
            match self.register_one(table.as_ref(), name, kind, &mut factory) {
                Ok(Some(binding)) => registered.push(binding),
                Ok(None) => {}
                Err(err) => warn!(command = %name, "{err}"),
            }
        }
        registered
    }

    fn register_one<F>(
        &mut self,
        table: &dyn DispatchTable,
        name: &str,
        kind: CommandKind,
        factory: &mut F,
    ) -> Result<Option<CommandBinding>, FakeListError>
    where
        F: FnMut(&str, CommandKind) -> HandlerRef,
    {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return Ok(None);
        }
        self.evict(table, &normalized);

        let handler = factory(name.trim(), kind);
        let labels = binding_labels(&normalized);
        for (idx, label) in labels.iter().enumerate() {
            if let Err(err) = table.install(label, Arc::clone(&handler)) {
                for done in &labels[..idx] {
                    remove_if_owned(table, done, &handler);
                }
                return Err(err);
            }
        }

        let binding = CommandBinding {
            name: normalized.clone(),
            kind,
            labels,
            handler,
        };
        self.bindings.insert(normalized, binding.clone());
        info!(command = %name.trim(), kind = ?kind, "registered command /{}", name.trim());
        Ok(Some(binding))
    }

    // Drop our previous binding for the name, then clear every label the new
    // binding will occupy regardless of who installed it.
    fn evict(&mut self, table: &dyn DispatchTable, normalized: &str) {
        if let Some(previous) = self.bindings.remove(normalized) {
            for label in &previous.labels {
                remove_if_owned(table, label, &previous.handler);
            }
        }
        for label in binding_labels(normalized) {
            if table.remove(&label).is_some() {
                debug!(label = %label, "evicted existing binding");
            }
        }
    }

    /// Remove the bindings for `names`. Unknown names are ignored.
    pub fn unregister_all(&mut self, names: &[String]) {
        let Some(table) = self.table.clone() else {
            for name in names {
                self.bindings.remove(&normalize(name));
            }
            return;
        };
        for name in names {
            let normalized = normalize(name);
            let Some(binding) = self.bindings.remove(&normalized) else {
                continue;
            };
            for label in &binding.labels {
                remove_if_owned(table.as_ref(), label, &binding.handler);
            }
            info!(command = %normalized, "unregistered command /{normalized}");
        }
    }

    /// Remove every binding this registry owns. Used at shutdown.
    pub fn unregister_everything(&mut self) {
        let names = self.bound_names();
        self.unregister_all(&names);
    }
}

fn remove_if_owned(table: &dyn DispatchTable, label: &str, handler: &HandlerRef) {
    let owned = table
        .find_binding(label)
        .is_some_and(|current| Arc::ptr_eq(&current, handler));
    if owned {
        table.remove(label);
    }
}
