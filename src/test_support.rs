//! Fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::app::{EddyError, Result};
use crate::domain::{FeedContent, FeedDefinition, FeedItem};
use crate::fetcher::FeedSource;
use crate::store::{MemoryStore, Store};

/// Serves canned items per feed URL. URLs without an entry fail.
#[derive(Default)]
pub struct FakeSource {
    feeds: Mutex<HashMap<String, Vec<FeedItem>>>,
    calls: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeSource {
    pub fn serve(&self, url: &str, titles: &[&str]) {
        let items = titles.iter().map(|t| item(url, t)).collect();
        self.feeds.lock().unwrap().insert(url.to_string(), items);
    }

    pub fn serve_items(&self, url: &str, items: Vec<FeedItem>) {
        self.feeds.lock().unwrap().insert(url.to_string(), items);
    }

    pub fn fail(&self, url: &str) {
        self.feeds.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every fetch wait until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl FeedSource for FakeSource {
    async fn fetch_feed(&self, def: &FeedDefinition) -> Result<FeedContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let items = self
            .feeds
            .lock()
            .unwrap()
            .get(&def.url)
            .cloned()
            .ok_or_else(|| EddyError::FeedParse(format!("no feed at {}", def.url)))?;

        let mut content = FeedContent::new(def);
        content.title = Some(format!("{} title", def.name));
        content.items = items;
        content.restamp(def);
        Ok(content)
    }
}

pub fn item(url: &str, title: &str) -> FeedItem {
    FeedItem::new(title, format!("{}/{}", url, title), format!("{} body", title))
}

/// Memory store whose saves can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl FlakyStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Option<Value> {
        self.inner.snapshot()
    }
}

impl Store for FlakyStore {
    fn load(&self) -> Result<Option<Value>> {
        self.inner.load()
    }

    fn save(&self, blob: &Value) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EddyError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save(blob)
    }
}
