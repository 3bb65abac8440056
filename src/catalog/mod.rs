//! Decoy catalog wiring.
//!
//! This module turns the `plugins` configuration (or its legacy name lists)
//! into an immutable, ordered [`Catalog`] snapshot. Types here are the only
//! representation of synthetic entries; real plugins come from the host's
//! [`Inventory`](crate::host::Inventory).

pub mod identity;
pub mod loader;
pub mod model;

pub use identity::{PluginCategory, names_match};
pub use loader::load_catalog;
pub use model::{Catalog, CatalogEntry};
