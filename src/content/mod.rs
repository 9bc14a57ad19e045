//! In-memory table of merged feed content, keyed by feed name.
//!
//! Every write recomputes the folder grouping and then broadcasts a
//! [`ContentChange`] to subscribers before returning.

use std::collections::BTreeMap;

use tokio::sync::broadcast;

use crate::domain::{FeedContent, FeedDefinition, FeedItem};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentChange {
    /// Content for these feeds was installed.
    Replaced(Vec<String>),
    Removed(String),
    Renamed { from: String, to: String },
}

/// Feed content grouped by folder label. The empty label holds ungrouped feeds.
pub type Grouped = BTreeMap<String, Vec<FeedContent>>;

pub struct ContentStore {
    table: BTreeMap<String, FeedContent>,
    // folder -> feed names, rebuilt on every write
    folders: BTreeMap<String, Vec<String>>,
    tx: broadcast::Sender<ContentChange>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl ContentStore {
    pub fn new(table: BTreeMap<String, FeedContent>) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        let mut store = Self {
            table,
            folders: BTreeMap::new(),
            tx,
        };
        store.regroup();
        store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentChange> {
        self.tx.subscribe()
    }

    pub fn get(&self, name: &str) -> Option<&FeedContent> {
        self.table.get(name)
    }

    pub fn table(&self) -> &BTreeMap<String, FeedContent> {
        &self.table
    }

    /// Every item of every feed, feed by feed.
    pub fn items(&self) -> Vec<FeedItem> {
        self.table
            .values()
            .flat_map(|content| content.items.iter().cloned())
            .collect()
    }

    pub fn grouped(&self) -> Grouped {
        self.folders
            .iter()
            .map(|(folder, names)| {
                let feeds = names
                    .iter()
                    .filter_map(|name| self.table.get(name).cloned())
                    .collect();
                (folder.clone(), feeds)
            })
            .collect()
    }

    /// Items whose id starts with `prefix`, with their feed name.
    pub fn find_items(&self, prefix: &str) -> Vec<(&str, &FeedItem)> {
        self.table
            .iter()
            .flat_map(|(name, content)| content.items.iter().map(move |item| (name.as_str(), item)))
            .filter(|(_, item)| item.id().starts_with(prefix))
            .collect()
    }

    pub fn replace(&mut self, name: &str, mut content: FeedContent) {
        content.name = name.to_string();
        self.table.insert(name.to_string(), content);
        self.regroup();
        self.notify(ContentChange::Replaced(vec![name.to_string()]));
    }

    /// Install a batch of contents, keyed by their names, with one notification.
    pub fn replace_all(&mut self, batch: Vec<FeedContent>) {
        if batch.is_empty() {
            return;
        }
        let names: Vec<String> = batch.iter().map(|content| content.name.clone()).collect();
        for content in batch {
            self.table.insert(content.name.clone(), content);
        }
        self.regroup();
        self.notify(ContentChange::Replaced(names));
    }

    pub fn remove(&mut self, name: &str) -> Option<FeedContent> {
        let removed = self.table.remove(name)?;
        self.regroup();
        self.notify(ContentChange::Removed(name.to_string()));
        Some(removed)
    }

    /// Move content under a new definition, restamping name and folder.
    pub fn rename(&mut self, from: &str, def: &FeedDefinition) {
        let Some(mut content) = self.table.remove(from) else {
            return;
        };
        content.restamp(def);
        self.table.insert(def.name.clone(), content);
        self.regroup();
        self.notify(ContentChange::Renamed {
            from: from.to_string(),
            to: def.name.clone(),
        });
    }

    fn regroup(&mut self) {
        let mut folders: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, content) in &self.table {
            folders
                .entry(content.folder.clone())
                .or_default()
                .push(name.clone());
        }
        self.folders = folders;
    }

    fn notify(&self, change: ContentChange) {
        // No receivers is fine; nothing is listening yet.
        let _ = self.tx.send(change);
    }
}
