use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display tier for a catalog entry.
///
/// Mirrors the host's two plugin-loading tiers. Unknown or missing categories
/// fold into `Bukkit`, the secondary tier, so every entry lands in exactly one
/// group when the list view partitions the catalog.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum PluginCategory {
    Paper,
    #[default]
    Bukkit,
}

impl Serialize for PluginCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PluginCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_label(&value))
    }
}

impl PluginCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginCategory::Paper => "paper",
            PluginCategory::Bukkit => "bukkit",
        }
    }

    /// Case-insensitive; anything other than `paper` is the secondary tier.
    pub fn from_label(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("paper") {
            PluginCategory::Paper
        } else {
            PluginCategory::Bukkit
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, PluginCategory::Paper)
    }
}

/// Case-insensitive name comparison used for every catalog lookup.
pub fn names_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}
