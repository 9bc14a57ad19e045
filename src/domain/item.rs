use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app::{EddyError, Result};

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}_/-]+$").expect("tag pattern is valid"));
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("number pattern is valid"));

/// Attached media reference (podcast audio, images, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enclosure {
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub enclosure: Option<Enclosure>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, with = "lenient_date")]
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient_date")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub feed: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// The fields that identify an item across refreshes.
///
/// Two items with equal keys are the same logical entry no matter when they
/// were fetched. An upstream edit to the content yields a new key, so the
/// edited entry shows up as new and its old flags are lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub content: &'a str,
}

impl ItemKey<'_> {
    /// Hex SHA-256 of the key, stable across runs.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [self.title, self.link, self.content] {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        hex::encode(hasher.finalize())
    }
}

impl FeedItem {
    pub fn new(title: impl Into<String>, link: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            content: content.into(),
            description: None,
            creator: None,
            category: None,
            enclosure: None,
            image: None,
            pub_date: None,
            created: Some(Utc::now()),
            feed: String::new(),
            folder: String::new(),
            read: false,
            favorite: false,
            tags: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> ItemKey<'_> {
        ItemKey {
            title: &self.title,
            link: &self.link,
            content: &self.content,
        }
    }

    /// Stable identifier derived from the identity key.
    pub fn id(&self) -> String {
        self.key().digest()
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }

    /// Clear user state back to what a never-seen item carries.
    pub fn reset_user_state(&mut self) {
        self.read = false;
        self.favorite = false;
        self.tags.clear();
    }

    pub fn copy_user_state(&mut self, from: &FeedItem) {
        self.read = from.read;
        self.favorite = from.favorite;
        self.tags = from.tags.clone();
    }
}

/// Validate a user-supplied tag name.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.chars().any(char::is_whitespace) {
        return Err(EddyError::InvalidTag(format!("{:?} contains whitespace", tag)));
    }
    if tag.contains('#') {
        return Err(EddyError::InvalidTag(format!("{:?} contains '#'", tag)));
    }
    if NUMBER_PATTERN.is_match(tag) {
        return Err(EddyError::InvalidTag(format!("{:?} is only digits", tag)));
    }
    if !TAG_PATTERN.is_match(tag) {
        return Err(EddyError::InvalidTag(format!(
            "{:?} may only contain letters, digits, '_', '-' and '/'",
            tag
        )));
    }
    Ok(())
}

pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Dates in stored settings come from several writers over the years:
/// RFC 3339, RFC 2822 and epoch milliseconds. Anything else reads as absent.
mod lenient_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => super::parse_date(&s),
            Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_deterministic() {
        let a = FeedItem::new("Title", "https://example.com/a", "body");
        let b = FeedItem::new("Title", "https://example.com/a", "body");
        assert_eq!(a.id(), b.id());
        assert_eq!(a.id().len(), 64);
        assert!(a.id().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_id_ignores_user_state_and_fetch_time() {
        let a = FeedItem::new("Title", "https://example.com/a", "body");
        let mut b = a.clone();
        b.read = true;
        b.tags.insert("rust".into());
        b.created = None;
        assert_eq!(a.key(), b.key());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_id_field_boundaries_matter() {
        let a = FeedItem::new("ab", "c", "");
        let b = FeedItem::new("a", "bc", "");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_display_title_without_title() {
        let item = FeedItem::new("", "https://example.com/a", "");
        assert_eq!(item.display_title(), "(Untitled)");
    }

    #[test]
    fn test_validate_tag() {
        assert!(validate_tag("rust").is_ok());
        assert!(validate_tag("lang/rust").is_ok());
        assert!(validate_tag("to-read_2024").is_ok());
        assert!(validate_tag("").is_err());
        assert!(validate_tag("two words").is_err());
        assert!(validate_tag("#rust").is_err());
        assert!(validate_tag("2024").is_err());
        assert!(validate_tag("a.b").is_err());
    }

    #[test]
    fn test_deserialize_legacy_dates() {
        let json = r#"{
            "title": "t",
            "link": "l",
            "content": "c",
            "pubDate": "Mon, 01 Jan 2024 00:00:00 GMT",
            "created": 1704067200000
        }"#;
        let item: FeedItem = serde_json::from_str(json).unwrap();
        let expected = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(item.pub_date, Some(expected));
        assert_eq!(item.created, Some(expected));
        assert!(!item.read);
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_garbage_date_reads_as_none() {
        let json = r#"{"title": "t", "pubDate": "yesterday-ish"}"#;
        let item: FeedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.pub_date, None);
    }
}
