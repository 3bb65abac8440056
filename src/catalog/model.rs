//! In-memory representation of the configured decoy catalog.
//!
//! A [`Catalog`] is built once per load and never mutated; reload replaces it
//! wholesale. Entries keep configuration order so views are deterministic
//! until the presentation layer applies its own shuffle.

use crate::catalog::identity::{PluginCategory, names_match};
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One synthetic plugin entry.
///
/// `name` is trimmed and never empty; `version` and `description` are empty
/// when unknown.
pub struct CatalogEntry {
    pub name: String,
    pub enabled: bool,
    pub version: String,
    pub description: String,
    pub authors: Vec<String>,
    pub category: PluginCategory,
}

impl CatalogEntry {
    /// Bare enabled/disabled entry in the secondary tier, as produced by the
    /// legacy name lists.
    pub fn bare(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
            version: String::new(),
            description: String::new(),
            authors: Vec::new(),
            category: PluginCategory::Bukkit,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Ordered, immutable sequence of catalog entries. Cheap to clone.
pub struct Catalog {
    entries: Arc<[CatalogEntry]>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose name matches `name` ignoring case.
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| names_match(&entry.name, name))
    }

    /// Entries a non-privileged caller may see, in catalog order.
    pub fn visible(&self, show_disabled: bool) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.enabled || show_disabled)
            .collect()
    }
}

impl FromIterator<CatalogEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
