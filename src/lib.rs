//! Shared library for the fakelist decoy inventory.
//!
//! Ordinary callers asking the host for its plugin list get a configured,
//! synthetic catalog; callers holding the real-list permission get the true
//! inventory. The crate owns the catalog, the command registration against
//! the host dispatch table and the rendering of every view. The host is only
//! reached through the adapter traits in [`host`], so the bundled binary and
//! the tests run everything in-process.

pub mod catalog;
pub mod coerce;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod markup;
pub mod presentation;
pub mod registry;
pub mod service;
pub mod text;

pub use catalog::{Catalog, CatalogEntry, PluginCategory, load_catalog};
pub use command::{CommandKind, Request};
pub use config::{ConfigSource, JsonFileSource, MemorySource, RuntimeConfig};
pub use error::FakeListError;
pub use host::{
    Caller, CommandHandler, DispatchTable, HandlerRef, InstalledPlugin, Inventory,
    MemoryDispatchTable, PermissionSet, ServerIdentity, StaticInventory,
};
pub use markup::{DialectFormatter, MarkupFormatter};
pub use presentation::Presenter;
pub use registry::{CommandBinding, CommandRegistry};
pub use service::{FakeListService, Host, Snapshot};
pub use text::{ClickAction, NamedColor, Style, Text};
