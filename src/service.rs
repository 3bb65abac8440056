//! Service lifecycle and the command handlers it installs.
//!
//! [`FakeListService::enable`] reads the configuration, attaches to the host
//! dispatch table and binds every configured list command, then the version
//! commands and the admin command. Config, catalog and bindings live behind one
//! mutex so a reload is observed either entirely or not at all. Handlers only
//! hold a weak reference back to the service; once it is dropped they answer
//! with a short notice instead of keeping it alive.

use crate::catalog::{Catalog, load_catalog};
use crate::command::{ADMIN_COMMAND, CommandKind, RELOAD_PERMISSION, Request, VERSION_COMMANDS};
use crate::config::{ConfigSource, RuntimeConfig};
use crate::error::FakeListError;
use crate::host::{Caller, CommandHandler, DispatchTable, HandlerRef, Inventory};
use crate::markup::{DialectFormatter, MarkupFormatter};
use crate::presentation::{
    MSG_ADMIN_USAGE, MSG_NO_PERMISSION, MSG_RELOAD_FAILED, MSG_RELOADED, MSG_SERVICE_GONE,
    Presenter,
};
use crate::registry::CommandRegistry;
use crate::text::Text;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Configuration and catalog published together.
pub struct Snapshot {
    pub config: RuntimeConfig,
    pub catalog: Catalog,
}

impl Snapshot {
    pub fn from_value(raw: &Value) -> Self {
        Self {
            config: RuntimeConfig::from_value(raw),
            catalog: load_catalog(raw),
        }
    }
}

/// Collaborators the host hands over at enable time.
pub struct Host {
    /// `Err` when the host cannot expose its dispatch table.
    pub table: Result<Arc<dyn DispatchTable>, FakeListError>,
    pub inventory: Arc<dyn Inventory>,
    pub formatter: Arc<dyn MarkupFormatter>,
}

impl Host {
    pub fn new(
        table: Result<Arc<dyn DispatchTable>, FakeListError>,
        inventory: Arc<dyn Inventory>,
    ) -> Self {
        Self {
            table,
            inventory,
            formatter: Arc::new(DialectFormatter),
        }
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn MarkupFormatter>) -> Self {
        self.formatter = formatter;
        self
    }
}

struct ServiceState {
    snapshot: Arc<Snapshot>,
    registry: CommandRegistry,
}

struct ServiceInner {
    source: Box<dyn ConfigSource>,
    inventory: Arc<dyn Inventory>,
    formatter: Arc<dyn MarkupFormatter>,
    state: Mutex<ServiceState>,
}

pub struct FakeListService {
    inner: Arc<ServiceInner>,
}

impl FakeListService {
    /// Load configuration and register every command.
    ///
    /// Never fails: an unreadable source starts from defaults and a missing
    /// dispatch table leaves the registry in disabled mode.
    pub fn enable(source: impl ConfigSource + 'static, host: Host) -> Self {
        let raw = match source.load() {
            Ok(raw) => raw,
            Err(err) => {
                warn!("{err:#}; starting from default configuration");
                Value::Null
            }
        };
        let snapshot = Arc::new(Snapshot::from_value(&raw));
        let inner = Arc::new(ServiceInner {
            source: Box::new(source),
            inventory: host.inventory,
            formatter: host.formatter,
            state: Mutex::new(ServiceState {
                snapshot,
                registry: CommandRegistry::attach(host.table),
            }),
        });

        let weak = Arc::downgrade(&inner);
        {
            let mut guard = inner.state.lock();
            let state = &mut *guard;
            state.registry.register_all(
                &state.snapshot.config.commands,
                CommandKind::List,
                handler_factory(&weak),
            );
            // Fixed commands are bound last and take over colliding names.
            let version_names: Vec<String> =
                VERSION_COMMANDS.iter().map(|name| name.to_string()).collect();
            state.registry.register_all(
                &version_names,
                CommandKind::Version,
                handler_factory(&weak),
            );
            state.registry.register_all(
                &[ADMIN_COMMAND.to_string()],
                CommandKind::Admin,
                handler_factory(&weak),
            );
            info!(
                commands = ?state.snapshot.config.commands,
                entries = state.snapshot.catalog.len(),
                "enabled"
            );
        }
        Self { inner }
    }

    /// Unbind everything this service installed.
    pub fn disable(self) {
        self.inner.state.lock().registry.unregister_everything();
        info!("disabled");
    }

    /// Current configuration and catalog.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot()
    }

    /// Names currently bound, lowercased.
    pub fn bound_commands(&self) -> Vec<String> {
        self.inner.state.lock().registry.bound_names()
    }

    pub fn is_registering(&self) -> bool {
        self.inner.state.lock().registry.is_enabled()
    }

    /// Re-read configuration and swap the configured commands.
    ///
    /// Requires the reload permission. On any error nothing changes.
    pub fn reload(&self, caller: &dyn Caller) -> Result<Arc<Snapshot>, FakeListError> {
        self.inner.reload(caller)
    }

    /// Answer one invocation of a command of `kind` without going through the
    /// dispatch table.
    pub fn execute(&self, kind: CommandKind, caller: &dyn Caller, args: &[String]) -> Text {
        self.inner.execute(kind, caller, args)
    }
}

impl ServiceInner {
    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.lock().snapshot)
    }

    fn reload(self: &Arc<Self>, caller: &dyn Caller) -> Result<Arc<Snapshot>, FakeListError> {
        if !caller.has_permission(RELOAD_PERMISSION) {
            return Err(FakeListError::PermissionDenied {
                permission: RELOAD_PERMISSION.to_string(),
            });
        }
        let raw = self.source.load()?;
        let next = Arc::new(Snapshot::from_value(&raw));
        let weak = Arc::downgrade(self);

        let mut guard = self.state.lock();
        let state = &mut *guard;
        let previous = state.snapshot.config.commands.clone();
        state.registry.unregister_all(&previous);
        state.registry.register_all(
            &next.config.commands,
            CommandKind::List,
            handler_factory(&weak),
        );
        state.snapshot = Arc::clone(&next);
        drop(guard);

        info!(
            caller = caller.name(),
            commands = ?next.config.commands,
            entries = next.catalog.len(),
            "reloaded configuration"
        );
        Ok(next)
    }

    fn execute(self: &Arc<Self>, kind: CommandKind, caller: &dyn Caller, args: &[String]) -> Text {
        let request = Request::parse(kind, args);
        let snapshot = self.snapshot();
        let presenter = Presenter::new(
            &snapshot.config,
            &snapshot.catalog,
            self.inventory.as_ref(),
            self.formatter.as_ref(),
        );
        let mut rng = rand::thread_rng();
        match request {
            Request::List => presenter.render_list(caller, &mut rng),
            Request::Info(name) => presenter.render_detail(caller, &name),
            Request::VersionAll => presenter.render_version(caller, &mut rng),
            Request::VersionOf(name) => presenter.render_version_for(caller, &name),
            Request::AdminUsage => presenter.markup(MSG_ADMIN_USAGE),
            Request::Reload => match self.reload(caller) {
                Ok(_) => presenter.markup(MSG_RELOADED),
                Err(FakeListError::PermissionDenied { permission }) => {
                    debug!(caller = caller.name(), %permission, "reload denied");
                    presenter.markup(MSG_NO_PERMISSION)
                }
                Err(err) => {
                    warn!(caller = caller.name(), "reload failed: {err}");
                    presenter.markup(MSG_RELOAD_FAILED)
                }
            },
        }
    }
}

fn handler_factory(
    service: &Weak<ServiceInner>,
) -> impl FnMut(&str, CommandKind) -> HandlerRef + '_ {
    move |label: &str, kind: CommandKind| -> HandlerRef {
        Arc::new(BoundCommand {
            label: label.to_string(),
            kind,
            service: Weak::clone(service),
        })
    }
}

/// Handler installed in the dispatch table for one configured name.
struct BoundCommand {
    label: String,
    kind: CommandKind,
    service: Weak<ServiceInner>,
}

impl CommandHandler for BoundCommand {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&self, caller: &dyn Caller, args: &[String]) -> Text {
        let Some(service) = self.service.upgrade() else {
            return DialectFormatter.parse(MSG_SERVICE_GONE);
        };
        debug!(
            command = %self.label,
            kind = self.kind.as_str(),
            caller = caller.name(),
            "dispatching"
        );
        service.execute(self.kind, caller, args)
    }
}
