use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::Result;
use crate::domain::FeedItem;

/// A configured feed source. `name` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDefinition {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub folder: String,
}

impl FeedDefinition {
    pub fn new(name: impl Into<String>, url: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            folder: folder.into(),
        }
    }

    /// Check the URL parses as an absolute URL.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.url)?;
        Ok(())
    }
}

/// Partial edit of a [`FeedDefinition`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct FeedEdit {
    pub name: Option<String>,
    pub url: Option<String>,
    pub folder: Option<String>,
}

impl FeedEdit {
    pub fn apply(&self, def: &FeedDefinition) -> FeedDefinition {
        FeedDefinition {
            name: self.name.clone().unwrap_or_else(|| def.name.clone()),
            url: self.url.clone().unwrap_or_else(|| def.url.clone()),
            folder: self.folder.clone().unwrap_or_else(|| def.folder.clone()),
        }
    }
}

/// Everything currently known about one feed: metadata from the last
/// successful fetch plus the merged item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedContent {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

impl FeedContent {
    pub fn new(def: &FeedDefinition) -> Self {
        Self {
            name: def.name.clone(),
            title: None,
            link: None,
            description: None,
            image: None,
            folder: def.folder.clone(),
            fetched_at: None,
            items: Vec::new(),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Stamp feed name and folder from `def` onto the content and its items.
    pub fn restamp(&mut self, def: &FeedDefinition) {
        self.name = def.name.clone();
        self.folder = def.folder.clone();
        for item in &mut self.items {
            item.feed = def.name.clone();
            item.folder = def.folder.clone();
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|item| !item.read).count()
    }
}
