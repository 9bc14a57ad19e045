//! One-shot upgrade of the legacy read/favorites layout.
//!
//! Older settings kept two top-level lists, `read` and `favorites`, each of
//! the form `{"items": [...]}`, instead of flags on the stored items. The
//! upgrade sets `read`/`favorite` on every stored item whose
//! (title, link, content) appears in the matching list and then drops both
//! keys. Blobs without the keys are left alone, so running it on every
//! startup is safe.

use std::collections::HashSet;

use serde_json::{Map, Value};

const LEGACY_READ: &str = "read";
const LEGACY_FAVORITES: &str = "favorites";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub migrated: bool,
    pub marked_read: usize,
    pub marked_favorite: usize,
}

type Identity = (String, String, String);

pub fn migrate_legacy(blob: &mut Value) -> MigrationReport {
    let Some(root) = blob.as_object_mut() else {
        return MigrationReport::default();
    };
    if !root.contains_key(LEGACY_READ) && !root.contains_key(LEGACY_FAVORITES) {
        return MigrationReport::default();
    }

    let read = root.remove(LEGACY_READ).map(identities).unwrap_or_default();
    let favorites = root
        .remove(LEGACY_FAVORITES)
        .map(identities)
        .unwrap_or_default();

    let mut report = MigrationReport {
        migrated: true,
        ..Default::default()
    };

    let Some(contents) = root.get_mut("items") else {
        return report;
    };
    for content in feed_contents(contents) {
        let Some(items) = content.get_mut("items").and_then(Value::as_array_mut) else {
            continue;
        };
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            let id = identity(item);
            if read.contains(&id) {
                item.insert("read".into(), Value::Bool(true));
                report.marked_read += 1;
            }
            if favorites.contains(&id) {
                item.insert("favorite".into(), Value::Bool(true));
                report.marked_favorite += 1;
            }
        }
    }

    report
}

fn feed_contents(items: &mut Value) -> Vec<&mut Value> {
    match items {
        Value::Object(map) => map.values_mut().collect(),
        Value::Array(list) => list.iter_mut().collect(),
        _ => Vec::new(),
    }
}

fn identities(list: Value) -> HashSet<Identity> {
    let entries = match list {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        Value::Array(entries) => entries,
        _ => Vec::new(),
    };
    entries
        .iter()
        .filter_map(Value::as_object)
        .map(identity)
        .collect()
}

fn identity(item: &Map<String, Value>) -> Identity {
    let field = |name: &str| {
        item.get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    (field("title"), field("link"), field("content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_blob() -> Value {
        json!({
            "read": {"items": [{"title": "X", "link": "l", "content": "c"}]},
            "favorites": {"items": [{"title": "Y", "link": "m", "content": "d"}]},
            "items": {
                "0": {"name": "blog", "items": [
                    {"title": "X", "link": "l", "content": "c", "read": false},
                    {"title": "Y", "link": "m", "content": "d", "read": false},
                    {"title": "Z", "link": "n", "content": "e", "read": false}
                ]}
            }
        })
    }

    #[test]
    fn test_marks_read_and_removes_keys() {
        let mut blob = legacy_blob();
        let report = migrate_legacy(&mut blob);

        assert!(report.migrated);
        assert_eq!(report.marked_read, 1);
        assert_eq!(report.marked_favorite, 1);

        let items = &blob["items"]["0"]["items"];
        assert_eq!(items[0]["read"], true);
        assert!(items[0].get("favorite").is_none());
        assert_eq!(items[1]["read"], false);
        assert_eq!(items[1]["favorite"], true);
        assert_eq!(items[2]["read"], false);

        assert!(blob.get("read").is_none());
        assert!(blob.get("favorites").is_none());
    }

    #[test]
    fn test_second_run_is_noop() {
        let mut blob = legacy_blob();
        migrate_legacy(&mut blob);
        let after_first = blob.clone();

        let report = migrate_legacy(&mut blob);
        assert!(!report.migrated);
        assert_eq!(blob, after_first);
    }

    #[test]
    fn test_partial_identity_match_is_not_enough() {
        let mut blob = json!({
            "read": {"items": [{"title": "X", "link": "l", "content": "changed"}]},
            "items": [{"name": "blog", "items": [{"title": "X", "link": "l", "content": "c"}]}]
        });
        let report = migrate_legacy(&mut blob);

        assert!(report.migrated);
        assert_eq!(report.marked_read, 0);
        assert!(blob["items"][0]["items"][0].get("read").is_none());
    }

    #[test]
    fn test_dangling_legacy_entries_ignored() {
        let mut blob = json!({
            "read": {"items": [{"title": "Gone", "link": "x", "content": "y"}]},
            "favorites": [{"title": "Also gone"}]
        });
        let report = migrate_legacy(&mut blob);

        assert!(report.migrated);
        assert_eq!(report.marked_read, 0);
        assert_eq!(blob, json!({}));
    }

    #[test]
    fn test_current_shape_untouched() {
        let mut blob = json!({"feeds": [], "items": {}, "updateTime": 60});
        let before = blob.clone();
        assert_eq!(migrate_legacy(&mut blob), MigrationReport::default());
        assert_eq!(blob, before);
    }

    #[test]
    fn test_missing_fields_compare_as_empty() {
        let mut blob = json!({
            "favorites": {"items": [{"title": "X"}]},
            "items": [{"name": "blog", "items": [{"title": "X", "link": null}]}]
        });
        migrate_legacy(&mut blob);
        assert_eq!(blob["items"][0]["items"][0]["favorite"], true);
    }
}
