//! The persisted settings aggregate and its load path.

pub mod migration;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::info;

use crate::app::Result;
use crate::domain::{FeedContent, FeedDefinition, FilterDefinition};
use crate::store::Store;

pub use migration::{migrate_legacy, MigrationReport};

pub const DEFAULT_UPDATE_MINUTES: u64 = 60;

/// Root of the settings blob. Field names match the on-disk JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub feeds: Vec<FeedDefinition>,
    /// Merged content per feed name.
    #[serde(deserialize_with = "contents_by_name")]
    pub items: BTreeMap<String, FeedContent>,
    pub filtered: Vec<FilterDefinition>,
    /// Minutes between automatic refreshes; 0 turns them off.
    pub update_time: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            items: BTreeMap::new(),
            filtered: Vec::new(),
            update_time: DEFAULT_UPDATE_MINUTES,
        }
    }
}

impl Settings {
    pub fn from_blob(blob: Value) -> Result<Self> {
        Ok(serde_json::from_value(blob)?)
    }

    pub fn to_blob(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn feed(&self, name: &str) -> Option<&FeedDefinition> {
        self.feeds.iter().find(|feed| feed.name == name)
    }

    pub fn filter(&self, name: &str) -> Option<&FilterDefinition> {
        self.filtered.iter().find(|filter| filter.name == name)
    }
}

pub fn interval_from_minutes(minutes: u64) -> Option<Duration> {
    (minutes > 0).then(|| Duration::from_secs(minutes * 60))
}

/// Load settings from `store`, running the legacy migration first.
///
/// A migrated blob is written back before decoding so the legacy keys are
/// gone from disk. A missing blob yields defaults.
pub fn load(store: &dyn Store) -> Result<(Settings, MigrationReport)> {
    let Some(mut blob) = store.load()? else {
        return Ok((Settings::default(), MigrationReport::default()));
    };

    let report = migrate_legacy(&mut blob);
    if report.migrated {
        info!(
            marked_read = report.marked_read,
            marked_favorite = report.marked_favorite,
            "Migrated legacy read/favorites lists"
        );
        store.save(&blob)?;
    }

    Ok((Settings::from_blob(blob)?, report))
}

// Older files hold `items` as an array, or as an object keyed by array
// index. Either way each entry carries its own feed name, which is the key.
fn contents_by_name<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, FeedContent>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        List(Vec<FeedContent>),
        Map(BTreeMap<String, FeedContent>),
    }

    let contents = match Shape::deserialize(deserializer)? {
        Shape::List(list) => list,
        Shape::Map(map) => map.into_values().collect(),
    };
    Ok(contents
        .into_iter()
        .map(|content| (content.name.clone(), content))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FilterType, SortOrder};
    use crate::store::MemoryStore;
    use serde_json::json;

    #[test]
    fn test_empty_blob_uses_defaults() {
        let settings = Settings::from_blob(json!({})).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.update_time, DEFAULT_UPDATE_MINUTES);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let settings = Settings::from_blob(json!({
            "updateTime": 0,
            "template": "# {{title}}",
            "saveLocation": "default"
        }))
        .unwrap();
        assert_eq!(settings.update_time, 0);
        assert_eq!(interval_from_minutes(settings.update_time), None);
    }

    #[test]
    fn test_items_accepts_index_keyed_object() {
        let settings = Settings::from_blob(json!({
            "items": {
                "0": {"name": "blog", "folder": "Tech", "items": [{"title": "A"}]},
                "1": {"name": "paper", "items": []}
            }
        }))
        .unwrap();

        assert_eq!(settings.items.len(), 2);
        assert_eq!(settings.items["blog"].items[0].title, "A");
        assert_eq!(settings.items["blog"].folder, "Tech");
        assert!(settings.items.contains_key("paper"));
    }

    #[test]
    fn test_items_accepts_list() {
        let settings = Settings::from_blob(json!({
            "items": [{"name": "blog", "items": []}]
        }))
        .unwrap();
        assert!(settings.items.contains_key("blog"));
    }

    #[test]
    fn test_blob_roundtrip_keeps_camel_case() {
        let mut settings = Settings::default();
        settings.feeds.push(FeedDefinition::new("blog", "https://example.com/feed", "Tech"));
        settings.filtered.push(FilterDefinition::new(
            "unread",
            FilterType::Unread,
            "",
            SortOrder::DateNewest,
        ));
        settings.update_time = 15;

        let blob = settings.to_blob().unwrap();
        assert_eq!(blob["updateTime"], 15);
        assert_eq!(blob["filtered"][0]["filterType"], "UNREAD");
        assert_eq!(Settings::from_blob(blob).unwrap(), settings);
    }

    #[test]
    fn test_update_interval() {
        assert_eq!(interval_from_minutes(0), None);
        assert_eq!(interval_from_minutes(2), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_load_missing_blob() {
        let store = MemoryStore::default();
        let (settings, report) = load(&store).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!report.migrated);
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_load_persists_migrated_blob() {
        let store = MemoryStore::with_blob(json!({
            "read": {"items": [{"title": "X", "link": "l", "content": "c"}]},
            "favorites": {"items": []},
            "items": [{"name": "blog", "items": [
                {"title": "X", "link": "l", "content": "c", "read": false}
            ]}]
        }));

        let (settings, report) = load(&store).unwrap();
        assert!(report.migrated);
        assert!(settings.items["blog"].items[0].read);

        let saved = store.snapshot().unwrap();
        assert!(saved.get("read").is_none());
        assert!(saved.get("favorites").is_none());
        assert_eq!(saved["items"][0]["items"][0]["read"], true);
    }
}
