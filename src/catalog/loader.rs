//! Builds a [`Catalog`] from raw configuration values.
//!
//! The structured `plugins` list wins whenever it yields at least one map;
//! otherwise the legacy `success_plugins` / `failed_plugins` name lists are
//! read as enabled and disabled secondary-tier entries. Individual fields
//! never fail to load: each one coerces to its documented default.

use crate::catalog::identity::PluginCategory;
use crate::catalog::model::{Catalog, CatalogEntry};
use crate::coerce::{value_as_flag, value_as_string, value_as_string_list};
use serde_json::{Map, Value};
use tracing::debug;

pub const PLUGINS_KEY: &str = "plugins";
pub const SUCCESS_PLUGINS_KEY: &str = "success_plugins";
pub const FAILED_PLUGINS_KEY: &str = "failed_plugins";

/// Load the catalog described by `raw`, preserving input order.
pub fn load_catalog(raw: &Value) -> Catalog {
    let structured = structured_entries(raw);
    if !structured.is_empty() {
        let entries: Vec<CatalogEntry> = structured.into_iter().filter_map(entry_from_map).collect();
        debug!(count = entries.len(), "loaded structured catalog");
        return Catalog::new(entries);
    }

    let mut entries = Vec::new();
    for name in value_as_string_list(raw.get(SUCCESS_PLUGINS_KEY), SUCCESS_PLUGINS_KEY) {
        entries.push(CatalogEntry::bare(name, true));
    }
    for name in value_as_string_list(raw.get(FAILED_PLUGINS_KEY), FAILED_PLUGINS_KEY) {
        entries.push(CatalogEntry::bare(name, false));
    }
    debug!(count = entries.len(), "loaded legacy catalog lists");
    Catalog::new(entries)
}

// Only map-shaped items count; a list of bare strings does not switch off the
// legacy fallback.
fn structured_entries(raw: &Value) -> Vec<&Map<String, Value>> {
    match raw.get(PLUGINS_KEY) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

fn entry_from_map(map: &Map<String, Value>) -> Option<CatalogEntry> {
    let name = value_as_string(map.get("name"), "plugins[].name");
    if name.is_empty() {
        return None;
    }
    Some(CatalogEntry {
        name,
        enabled: value_as_flag(map.get("enabled"), "plugins[].enabled", true),
        version: value_as_string(map.get("version"), "plugins[].version"),
        description: value_as_string(map.get("description"), "plugins[].description"),
        authors: value_as_string_list(map.get("authors"), "plugins[].authors"),
        category: PluginCategory::from_label(&value_as_string(
            map.get("category"),
            "plugins[].category",
        )),
    })
}
