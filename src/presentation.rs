//! Permission-gated rendering of the list, detail and version views.
//!
//! Every view is a function of one snapshot (config plus catalog), the real
//! inventory and the caller's privilege. Header templates are the only
//! configured strings that go through the markup formatter; plugin names and
//! metadata are placed into [`Text`] nodes directly so configured data cannot
//! inject markup.

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::RuntimeConfig;
use crate::host::{Caller, InstalledPlugin, Inventory};
use crate::markup::MarkupFormatter;
use crate::text::{ClickAction, NamedColor, Text};
use rand::Rng;
use rand::seq::SliceRandom;

pub const MSG_NO_PERMISSION: &str = "<red>You do not have permission to do that.</red>";
pub const MSG_RELOADED: &str = "<green>FakePluginsList config reloaded.</green>";
pub const MSG_RELOAD_FAILED: &str =
    "<red>FakePluginsList config could not be read; nothing was changed.</red>";
pub const MSG_SERVICE_GONE: &str = "<red>FakePluginsList is not running.</red>";
pub const MSG_SPECIFY_NAME: &str = "<red>Please specify a plugin name.</red>";
pub const MSG_NOT_FOUND: &str = "<red>Plugin not found.</red>";
pub const MSG_NO_SUCH_PLUGIN: &str =
    "<red>This server is not running any plugin by that name.</red>";
pub const MSG_ADMIN_USAGE: &str = "<yellow>Usage: /fakepluginslist reload</yellow>";

const EMPTY_LISTING: &str = " &8-";
const LISTING_PREFIX: &str = " &8- ";
const SEPARATOR: &str = ", ";
const UNKNOWN: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Counts substituted into header templates.
pub struct GroupCounts {
    pub total: usize,
    pub enabled: usize,
}

impl GroupCounts {
    pub fn of_flags(flags: impl IntoIterator<Item = bool>) -> Self {
        flags.into_iter().fold(Self::default(), |acc, enabled| Self {
            total: acc.total + 1,
            enabled: acc.enabled + usize::from(enabled),
        })
    }

    pub fn disabled(&self) -> usize {
        self.total.saturating_sub(self.enabled)
    }
}

/// Substitute `%count%`, `%enabled_count%` and `%disabled_count%`.
pub fn replace_counts(template: &str, counts: GroupCounts) -> String {
    template
        .replace("%count%", &counts.total.to_string())
        .replace("%enabled_count%", &counts.enabled.to_string())
        .replace("%disabled_count%", &counts.disabled().to_string())
}

fn state_color(enabled: bool) -> NamedColor {
    if enabled {
        NamedColor::Green
    } else {
        NamedColor::Red
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Visible entries split by tier, after filtering and the optional shuffle.
pub struct GroupedView<'a> {
    pub primary: Vec<&'a CatalogEntry>,
    pub secondary: Vec<&'a CatalogEntry>,
}

impl<'a> GroupedView<'a> {
    /// Primary tier followed by secondary tier.
    pub fn combined(&self) -> impl Iterator<Item = &'a CatalogEntry> + '_ {
        self.primary.iter().chain(self.secondary.iter()).copied()
    }

    pub fn counts(&self) -> GroupCounts {
        GroupCounts::of_flags(self.combined().map(|entry| entry.enabled))
    }
}

pub struct Presenter<'a> {
    config: &'a RuntimeConfig,
    catalog: &'a Catalog,
    inventory: &'a dyn Inventory,
    formatter: &'a dyn MarkupFormatter,
}

impl<'a> Presenter<'a> {
    pub fn new(
        config: &'a RuntimeConfig,
        catalog: &'a Catalog,
        inventory: &'a dyn Inventory,
        formatter: &'a dyn MarkupFormatter,
    ) -> Self {
        Self {
            config,
            catalog,
            inventory,
            formatter,
        }
    }

    pub fn markup(&self, input: &str) -> Text {
        self.formatter.parse(input)
    }

    /// Whether `caller` may see real data. An empty permission unlocks nothing.
    pub fn is_privileged(&self, caller: &dyn Caller) -> bool {
        let permission = self.config.real_list_permission.as_str();
        !permission.is_empty() && caller.has_permission(permission)
    }

    /// Filter by enabled state, partition by tier and shuffle each tier.
    pub fn grouped_view<R: Rng + ?Sized>(&self, rng: &mut R) -> GroupedView<'a> {
        let (mut primary, mut secondary): (Vec<_>, Vec<_>) = self
            .catalog
            .visible(self.config.show_disabled)
            .into_iter()
            .partition(|entry| entry.category.is_primary());
        if self.config.random_order {
            primary.shuffle(rng);
            secondary.shuffle(rng);
        }
        GroupedView { primary, secondary }
    }

    /// Visible entries as one list, shuffled as a whole when enabled.
    pub fn visible_entries<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<&'a CatalogEntry> {
        let mut visible = self.catalog.visible(self.config.show_disabled);
        if self.config.random_order {
            visible.shuffle(rng);
        }
        visible
    }

    pub fn render_list<R: Rng + ?Sized>(&self, caller: &dyn Caller, rng: &mut R) -> Text {
        if self.is_privileged(caller) {
            return self.render_real_list(rng);
        }
        let view = self.grouped_view(rng);
        let primary = GroupCounts::of_flags(view.primary.iter().map(|entry| entry.enabled));
        let secondary = GroupCounts::of_flags(view.secondary.iter().map(|entry| entry.enabled));

        Text::empty()
            .append(self.markup(&replace_counts(&self.config.server_header, view.counts())))
            .append(Text::newline())
            .append(self.markup(&replace_counts(&self.config.paper_header, primary)))
            .append(Text::newline())
            .append(self.listing_line(&view.primary))
            .append(Text::newline())
            .append(self.markup(&replace_counts(&self.config.bukkit_header, secondary)))
            .append(Text::newline())
            .append(self.listing_line(&view.secondary))
    }

    fn listing_line(&self, entries: &[&CatalogEntry]) -> Text {
        if entries.is_empty() {
            return self.markup(EMPTY_LISTING);
        }
        let primary_command = self.config.primary_command();
        let mut line = self.markup(LISTING_PREFIX);
        for (idx, entry) in entries.iter().enumerate() {
            if idx > 0 {
                line = line.append(Text::colored(SEPARATOR, NamedColor::White));
            }
            line = line.append(
                Text::colored(entry.name.as_str(), state_color(entry.enabled))
                    .with_hover(entry_details(entry))
                    .with_click(ClickAction::RunCommand(format!(
                        "/{primary_command} info {}",
                        entry.name
                    ))),
            );
        }
        line
    }

    /// Privileged list: server header over the real inventory, no tiers.
    pub fn render_real_list<R: Rng + ?Sized>(&self, rng: &mut R) -> Text {
        let mut plugins = self.inventory.plugins();
        if self.config.random_order {
            plugins.shuffle(rng);
        }
        let counts = GroupCounts::of_flags(plugins.iter().map(|plugin| plugin.enabled));
        let mut line = self.markup(LISTING_PREFIX);
        for (idx, plugin) in plugins.iter().enumerate() {
            if idx > 0 {
                line = line.append(Text::colored(SEPARATOR, NamedColor::White));
            }
            line = line.append(Text::colored(plugin.name.as_str(), state_color(plugin.enabled)));
        }
        Text::empty()
            .append(self.markup(&replace_counts(&self.config.server_header, counts)))
            .append(Text::newline())
            .append(line)
    }

    /// Detail lookup is not gated on privilege; `_caller` keeps the view
    /// signatures uniform.
    pub fn render_detail(&self, _caller: &dyn Caller, target: &str) -> Text {
        if target.is_empty() {
            return self.markup(MSG_SPECIFY_NAME);
        }
        match self.catalog.find(target) {
            Some(entry) => Text::empty()
                .append(Text::colored(entry.name.as_str(), NamedColor::Gold))
                .append(Text::newline())
                .append(entry_details(entry)),
            None => self.markup(MSG_NOT_FOUND),
        }
    }

    pub fn render_version<R: Rng + ?Sized>(&self, caller: &dyn Caller, rng: &mut R) -> Text {
        let line = if self.is_privileged(caller) {
            let plugins = self.inventory.plugins();
            plugins_line(plugins.iter().map(|p| (p.name.as_str(), p.enabled)))
        } else {
            let visible = self.visible_entries(rng);
            plugins_line(visible.iter().map(|e| (e.name.as_str(), e.enabled)))
        };
        Text::empty()
            .append(self.server_banner())
            .append(Text::newline())
            .append(line)
    }

    pub fn render_version_for(&self, caller: &dyn Caller, target: &str) -> Text {
        if target.is_empty() {
            return self.markup(MSG_SPECIFY_NAME);
        }
        if self.is_privileged(caller) {
            if let Some(InstalledPlugin { name, version, .. }) = self.inventory.find(target) {
                return version_line(&name, &version);
            }
        }
        match self.catalog.find(target) {
            Some(entry) => version_line(&entry.name, &entry.version),
            None => self.markup(MSG_NO_SUCH_PLUGIN),
        }
    }

    fn server_banner(&self) -> Text {
        let server = self.inventory.server();
        Text::colored(
            format!(
                "This server is running {} version {} (Implementing API version {})",
                server.name, server.version, server.api_version
            ),
            NamedColor::White,
        )
    }
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() { UNKNOWN } else { value }
}

fn detail_line(label: &str, value: Option<String>, fallback: &str) -> Text {
    let value = match value {
        Some(value) => Text::colored(value, NamedColor::Green),
        None => Text::colored(fallback, NamedColor::Gray),
    };
    Text::empty()
        .append(Text::colored(format!("{label}: "), NamedColor::White))
        .append(value)
}

/// Version / Description / Author block shared by hover text and detail view.
pub fn entry_details(entry: &CatalogEntry) -> Text {
    let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
    let authors = (!entry.authors.is_empty()).then(|| entry.authors.join(", "));
    Text::empty()
        .append(detail_line("Version", non_empty(&entry.version), UNKNOWN))
        .append(Text::newline())
        .append(detail_line(
            "Description",
            non_empty(&entry.description),
            NO_DESCRIPTION,
        ))
        .append(Text::newline())
        .append(detail_line("Author", authors, UNKNOWN))
}

fn plugins_line<'n>(entries: impl ExactSizeIterator<Item = (&'n str, bool)>) -> Text {
    let mut line = Text::colored(format!("Plugins ({}): ", entries.len()), NamedColor::White);
    for (idx, (name, enabled)) in entries.enumerate() {
        if idx > 0 {
            line = line.append(Text::colored(SEPARATOR, NamedColor::White));
        }
        line = line.append(Text::colored(name, state_color(enabled)));
    }
    line
}

fn version_line(name: &str, version: &str) -> Text {
    Text::empty()
        .append(Text::colored(name, NamedColor::Green))
        .append(Text::colored(" version ", NamedColor::White))
        .append(Text::colored(or_unknown(version), NamedColor::Green))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_catalog;
    use crate::host::{PermissionSet, ServerIdentity, StaticInventory};
    use crate::markup::DialectFormatter;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::{Value, json};
    use std::collections::BTreeMap;

    struct Fixture {
        config: RuntimeConfig,
        catalog: Catalog,
        inventory: StaticInventory,
    }

    impl Fixture {
        fn new(raw: Value) -> Self {
            Self {
                config: RuntimeConfig::from_value(&raw),
                catalog: load_catalog(&raw),
                inventory: StaticInventory::new(
                    ServerIdentity {
                        name: "Paper".into(),
                        version: "1.21.4-R0.1".into(),
                        api_version: "1.21.4-R0.1-SNAPSHOT".into(),
                    },
                    vec![
                        InstalledPlugin {
                            name: "LuckPerms".into(),
                            enabled: true,
                            version: "5.4.102".into(),
                        },
                        InstalledPlugin {
                            name: "Broken".into(),
                            enabled: false,
                            version: String::new(),
                        },
                    ],
                ),
            }
        }

        fn presenter(&self) -> Presenter<'_> {
            Presenter::new(&self.config, &self.catalog, &self.inventory, &DialectFormatter)
        }
    }

    fn scenario(show_disabled: bool) -> Fixture {
        Fixture::new(json!({
            "commands": ["plugins"],
            "plugins": [
                {"name": "Alpha", "enabled": true, "category": "paper"},
                {"name": "Beta", "enabled": false}
            ],
            "show_disabled_plugins": show_disabled,
            "random_order": false
        }))
    }

    fn color_of(text: &Text, content: &str) -> Option<NamedColor> {
        text.segments()
            .into_iter()
            .find(|segment| segment.content == content)
            .and_then(|segment| segment.style.color)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn list_view_groups_by_tier_with_counts() {
        let fixture = scenario(true);
        let caller = PermissionSet::new("steve");
        let text = fixture.presenter().render_list(&caller, &mut rng());
        assert_eq!(
            text.to_plain(),
            "? Server Plugins (2)\nPaper Plugins (1):\n - Alpha\nBukkit Plugins (1):\n - Beta"
        );
        assert_eq!(color_of(&text, "Alpha"), Some(NamedColor::Green));
        assert_eq!(color_of(&text, "Beta"), Some(NamedColor::Red));
    }

    #[test]
    fn list_view_hides_disabled_when_configured() {
        let fixture = scenario(false);
        let caller = PermissionSet::new("steve");
        let text = fixture.presenter().render_list(&caller, &mut rng());
        assert_eq!(
            text.to_plain(),
            "? Server Plugins (1)\nPaper Plugins (1):\n - Alpha\nBukkit Plugins (0):\n -"
        );
    }

    #[test]
    fn list_entries_carry_hover_and_click() {
        let fixture = Fixture::new(json!({
            "commands": ["pl", "plugins"],
            "plugins": [{"name": "Vault", "version": "1.7", "authors": ["cereal", "Sleaker"]}],
            "random_order": false
        }));
        let text = fixture
            .presenter()
            .render_list(&PermissionSet::new("steve"), &mut rng());
        let segment = text
            .segments()
            .into_iter()
            .find(|s| s.content == "Vault")
            .expect("vault listed");
        assert_eq!(
            segment.click,
            Some(&ClickAction::RunCommand("/pl info Vault".to_string()))
        );
        let hover = segment.hover.expect("hover attached").to_plain();
        assert_eq!(
            hover,
            "Version: 1.7\nDescription: No description\nAuthor: cereal, Sleaker"
        );
    }

    #[test]
    fn templates_substitute_all_count_tokens() {
        let counts = GroupCounts::of_flags([true, false, true]);
        assert_eq!(
            replace_counts("%count%/%enabled_count%/%disabled_count%", counts),
            "3/2/1"
        );
    }

    #[test]
    fn shuffle_is_a_permutation_per_tier() {
        let mut plugins = Vec::new();
        for i in 0..40 {
            let category = if i % 3 == 0 { "paper" } else { "bukkit" };
            plugins.push(json!({"name": format!("P{i}"), "enabled": i % 2 == 0, "category": category}));
        }
        let fixture = Fixture::new(json!({"plugins": plugins, "random_order": true}));
        let presenter = fixture.presenter();

        for seed in 0..10 {
            let view = presenter.grouped_view(&mut StdRng::seed_from_u64(seed));
            let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
            for entry in view.combined() {
                *seen.entry(entry.name.as_str()).or_insert(0) += 1;
            }
            assert_eq!(seen.len(), 40);
            assert!(seen.values().all(|count| *count == 1));
            assert!(view.primary.iter().all(|e| e.category.is_primary()));
            assert!(view.secondary.iter().all(|e| !e.category.is_primary()));
            assert_eq!(view.counts().total, view.primary.len() + view.secondary.len());
        }
    }

    #[test]
    fn privileged_list_shows_real_inventory() {
        let fixture = scenario(true);
        let caller = PermissionSet::new("admin").grant("fakepluginslist.real");
        let text = fixture.presenter().render_list(&caller, &mut rng());
        assert_eq!(text.to_plain(), "? Server Plugins (2)\n - LuckPerms, Broken");
        assert_eq!(color_of(&text, "Broken"), Some(NamedColor::Red));
    }

    #[test]
    fn empty_permission_never_unlocks_real_data() {
        let fixture = Fixture::new(json!({"real_list_permission": "", "random_order": false}));
        let op = PermissionSet::operator("root");
        assert!(!fixture.presenter().is_privileged(&op));
    }

    #[test]
    fn detail_view_prompts_misses_and_defaults() {
        let fixture = Fixture::new(json!({
            "plugins": [{"name": "foo"}, {"name": "Bar", "version": "2.0", "description": "Bars", "authors": ["Ann"]}]
        }));
        let presenter = fixture.presenter();
        let steve = PermissionSet::new("steve");
        assert_eq!(
            presenter.render_detail(&steve, "").to_plain(),
            "Please specify a plugin name."
        );
        assert_eq!(
            presenter.render_detail(&steve, "Unknown-Name").to_plain(),
            "Plugin not found."
        );
        assert_eq!(
            presenter.render_detail(&steve, "Foo").to_plain(),
            "foo\nVersion: Unknown\nDescription: No description\nAuthor: Unknown"
        );
        let detail = presenter.render_detail(&steve, "bar");
        assert_eq!(
            detail.to_plain(),
            "Bar\nVersion: 2.0\nDescription: Bars\nAuthor: Ann"
        );
        assert_eq!(color_of(&detail, "Bar"), Some(NamedColor::Gold));
    }

    #[test]
    fn version_view_lists_synthetic_or_real() {
        let fixture = scenario(true);
        let presenter = fixture.presenter();
        let text = presenter.render_version(&PermissionSet::new("steve"), &mut rng());
        assert_eq!(
            text.to_plain(),
            "This server is running Paper version 1.21.4-R0.1 (Implementing API version 1.21.4-R0.1-SNAPSHOT)\nPlugins (2): Alpha, Beta"
        );
        assert!(text.segments().iter().all(|s| s.click.is_none() && s.hover.is_none()));

        let admin = PermissionSet::new("admin").grant("fakepluginslist.real");
        let text = presenter.render_version(&admin, &mut rng());
        assert!(text.to_plain().ends_with("Plugins (2): LuckPerms, Broken"));
    }

    #[test]
    fn disabled_count_never_underflows() {
        let counts = GroupCounts {
            total: 0,
            enabled: 1,
        };
        assert_eq!(counts.disabled(), 0);
        assert_eq!(replace_counts("%disabled_count%", counts), "0");
    }

    #[test]
    fn version_view_applies_enabled_filter() {
        let fixture = scenario(false);
        let text = fixture
            .presenter()
            .render_version(&PermissionSet::new("steve"), &mut rng());
        let plain = text.to_plain();
        assert!(plain.ends_with("\nPlugins (1): Alpha"), "got {plain}");
        assert!(!plain.contains("Beta"));
    }

    #[test]
    fn visible_entries_shuffle_is_a_permutation() {
        let plugins: Vec<Value> = (0..30)
            .map(|i| json!({"name": format!("V{i}"), "enabled": i % 4 != 0}))
            .collect();
        let fixture = Fixture::new(json!({
            "plugins": plugins,
            "random_order": true,
            "show_disabled_plugins": false
        }));
        let presenter = fixture.presenter();
        let expected: Vec<&str> = fixture
            .catalog
            .visible(false)
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();

        for seed in 0..10 {
            let mut names: Vec<&str> = presenter
                .visible_entries(&mut StdRng::seed_from_u64(seed))
                .into_iter()
                .map(|e| e.name.as_str())
                .collect();
            names.sort_unstable();
            let mut want = expected.clone();
            want.sort_unstable();
            assert_eq!(names, want, "seed {seed}");
        }
    }

    #[test]
    fn real_list_shuffle_is_a_permutation() {
        let mut fixture = Fixture::new(json!({"random_order": true}));
        let plugins: Vec<InstalledPlugin> = (0..30)
            .map(|i| InstalledPlugin {
                name: format!("R{i}"),
                enabled: i % 3 != 0,
                version: String::new(),
            })
            .collect();
        fixture.inventory = StaticInventory::new(ServerIdentity::default(), plugins);
        let presenter = fixture.presenter();
        let mut want: Vec<String> = (0..30).map(|i| format!("R{i}")).collect();
        want.sort_unstable();

        for seed in 0..10 {
            let plain = presenter
                .render_real_list(&mut StdRng::seed_from_u64(seed))
                .to_plain();
            let (header, line) = plain.split_once('\n').expect("two lines");
            assert_eq!(header, "? Server Plugins (30)");
            let mut names: Vec<String> = line
                .trim_start_matches(" - ")
                .split(", ")
                .map(str::to_string)
                .collect();
            names.sort_unstable();
            assert_eq!(names, want, "seed {seed}");
        }
    }

    #[test]
    fn version_of_one_prefers_real_for_privileged() {
        let fixture = Fixture::new(json!({
            "plugins": [{"name": "LuckPerms", "version": "9.9"}, {"name": "Decoy"}]
        }));
        let presenter = fixture.presenter();
        let steve = PermissionSet::new("steve");
        let admin = PermissionSet::new("admin").grant("fakepluginslist.real");

        assert_eq!(
            presenter.render_version_for(&steve, "").to_plain(),
            "Please specify a plugin name."
        );
        assert_eq!(
            presenter.render_version_for(&steve, "luckperms").to_plain(),
            "LuckPerms version 9.9"
        );
        assert_eq!(
            presenter.render_version_for(&admin, "luckperms").to_plain(),
            "LuckPerms version 5.4.102"
        );
        assert_eq!(
            presenter.render_version_for(&admin, "decoy").to_plain(),
            "Decoy version Unknown"
        );
        assert_eq!(
            presenter.render_version_for(&admin, "Broken").to_plain(),
            "Broken version Unknown"
        );
        assert_eq!(
            presenter.render_version_for(&steve, "Nope").to_plain(),
            "This server is not running any plugin by that name."
        );
    }
}
