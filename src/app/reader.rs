//! The reader owns all mutable state: settings, feed content and the
//! evaluated filtered folders.
//!
//! Every mutation takes the state lock, builds the next settings blob,
//! persists it and only then applies the change in memory and notifies
//! subscribers. A failed save therefore leaves both memory and disk as they
//! were. Network fetches run without the lock.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::app::{EddyError, Result};
use crate::content::{ContentChange, ContentStore, Grouped};
use crate::domain::{
    validate_tag, FeedContent, FeedDefinition, FeedEdit, FeedItem, FilterDefinition,
    FilteredFolderContent,
};
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::FeedSource;
use crate::filter;
use crate::merge::merge;
use crate::settings::{self, Settings};
use crate::store::Store;

const UPDATE_CAPACITY: usize = 16;

/// What presentation receives after every change.
#[derive(Debug, Clone)]
pub struct ViewUpdate {
    pub grouped: Arc<Grouped>,
    pub filtered: Arc<Vec<FilteredFolderContent>>,
}

#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Feeds whose content was replaced.
    pub updated: Vec<String>,
    /// Feeds that could not be fetched, with the reason.
    pub failed: Vec<(String, String)>,
    /// Items not seen in the previous content of their feed.
    pub new_items: usize,
}

struct ReaderState {
    // `settings.items` stays empty; `content` is the live copy.
    settings: Settings,
    content: ContentStore,
    views: Arc<Vec<FilteredFolderContent>>,
}

pub struct Reader {
    store: Arc<dyn Store + Send + Sync>,
    fetcher: ParallelFetcher,
    state: Mutex<ReaderState>,
    refreshing: AtomicBool,
    updates: broadcast::Sender<ViewUpdate>,
    interval: watch::Sender<u64>,
}

struct RefreshGuard<'a>(&'a AtomicBool);

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| EddyError::RefreshInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Reader {
    /// Load settings from `store` (migrating legacy data) and build the
    /// in-memory state.
    pub fn load(
        store: Arc<dyn Store + Send + Sync>,
        source: Arc<dyn FeedSource + Send + Sync>,
        workers: usize,
    ) -> Result<Self> {
        let (mut settings, _) = settings::load(store.as_ref())?;
        let content = ContentStore::new(std::mem::take(&mut settings.items));
        let views = Arc::new(filter::evaluate(&content.items(), &settings.filtered));
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let (interval, _) = watch::channel(settings.update_time);

        debug!(
            feeds = settings.feeds.len(),
            filters = settings.filtered.len(),
            "Reader loaded"
        );

        Ok(Self {
            store,
            fetcher: ParallelFetcher::with_workers(source, workers),
            state: Mutex::new(ReaderState {
                settings,
                content,
                views,
            }),
            refreshing: AtomicBool::new(false),
            updates,
            interval,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.updates.subscribe()
    }

    pub async fn content_changes(&self) -> broadcast::Receiver<ContentChange> {
        self.state.lock().await.content.subscribe()
    }

    /// Refresh interval in minutes, updated whenever it is changed.
    pub fn interval_watch(&self) -> watch::Receiver<u64> {
        self.interval.subscribe()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    // ---- queries ----

    pub async fn feeds(&self) -> Vec<FeedDefinition> {
        self.state.lock().await.settings.feeds.clone()
    }

    pub async fn filters(&self) -> Vec<FilterDefinition> {
        self.state.lock().await.settings.filtered.clone()
    }

    pub async fn update_time(&self) -> u64 {
        self.state.lock().await.settings.update_time
    }

    pub async fn content(&self, feed: &str) -> Option<FeedContent> {
        self.state.lock().await.content.get(feed).cloned()
    }

    pub async fn grouped(&self) -> Grouped {
        self.state.lock().await.content.grouped()
    }

    pub async fn views(&self) -> Arc<Vec<FilteredFolderContent>> {
        self.state.lock().await.views.clone()
    }

    pub async fn view(&self, name: &str) -> Result<FilteredFolderContent> {
        self.views()
            .await
            .iter()
            .find(|view| view.filter.name == name)
            .cloned()
            .ok_or_else(|| EddyError::FilterNotFound(name.to_string()))
    }

    /// Look up an item by id or unique id prefix.
    pub async fn find_item(&self, id: &str) -> Result<FeedItem> {
        let state = self.state.lock().await;
        let id = resolve(&state.content, id)?;
        state
            .content
            .find_items(&id)
            .into_iter()
            .map(|(_, item)| item.clone())
            .next()
            .ok_or(EddyError::ItemNotFound(id))
    }

    // ---- refresh ----

    /// Fetch every configured feed and merge the results into the store.
    ///
    /// A feed that fails keeps its previous content. Returns
    /// [`EddyError::RefreshInProgress`] if another refresh is running.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let _guard = RefreshGuard::acquire(&self.refreshing)?;

        let feeds = self.state.lock().await.settings.feeds.clone();
        let mut report = RefreshReport::default();
        if feeds.is_empty() {
            info!("No feeds to refresh");
            return Ok(report);
        }

        info!("Refreshing {} feeds", feeds.len());
        let results = self.fetcher.fetch_all(feeds).await;

        let mut state = self.state.lock().await;
        let mut batch = Vec::new();
        for (def, result) in results {
            let mut fresh = match result {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!("Failed to refresh {}: {}", def.name, e);
                    report.failed.push((def.name, e.to_string()));
                    continue;
                }
            };

            // The definition may have been edited or removed while fetching.
            let Some(current) = state.settings.feed(&def.name).cloned() else {
                debug!("{} was removed during refresh, dropping result", def.name);
                continue;
            };
            if current.url != def.url {
                debug!("{} changed URL during refresh, dropping result", def.name);
                continue;
            }

            let previous = state
                .content
                .get(&def.name)
                .map(|content| content.items.as_slice())
                .unwrap_or(&[]);
            let known: HashSet<_> = previous.iter().map(FeedItem::key).collect();
            let new_count = fresh
                .items
                .iter()
                .filter(|item| !known.contains(&item.key()))
                .count();

            fresh.items = merge(previous, std::mem::take(&mut fresh.items));
            fresh.restamp(&current);

            debug!("{}: {} items, {} new", def.name, fresh.items.len(), new_count);
            report.new_items += new_count;
            report.updated.push(def.name);
            batch.push(fresh);
        }

        if !batch.is_empty() {
            self.commit_contents(&mut state, batch)?;
        }

        info!(
            "Refresh complete: {} updated, {} new items, {} failed",
            report.updated.len(),
            report.new_items,
            report.failed.len()
        );
        Ok(report)
    }

    // ---- item state ----

    pub async fn set_read(&self, id: &str, read: bool) -> Result<FeedItem> {
        self.update_item(id, |item| item.read = read).await
    }

    pub async fn set_favorite(&self, id: &str, favorite: bool) -> Result<FeedItem> {
        self.update_item(id, |item| item.favorite = favorite).await
    }

    /// Replace the tags on an item. Every tag is validated first.
    pub async fn set_tags<I, S>(&self, id: &str, tags: I) -> Result<FeedItem>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        for tag in &tags {
            validate_tag(tag)?;
        }
        self.update_item(id, move |item| item.tags = tags.clone()).await
    }

    async fn update_item<F>(&self, id: &str, mut apply: F) -> Result<FeedItem>
    where
        F: FnMut(&mut FeedItem),
    {
        let mut state = self.state.lock().await;
        let id = resolve(&state.content, id)?;

        // The same entry may sit in several feeds, or twice in one; every
        // copy shares state.
        let mut batch = Vec::new();
        let mut updated = None;
        for content in state.content.table().values() {
            if !content.items.iter().any(|item| item.id() == id) {
                continue;
            }
            let mut content = content.clone();
            for item in content.items.iter_mut().filter(|item| item.id() == id) {
                apply(item);
                updated.get_or_insert_with(|| item.clone());
            }
            batch.push(content);
        }
        let updated = updated.ok_or(EddyError::ItemNotFound(id))?;

        self.commit_contents(&mut state, batch)?;
        Ok(updated)
    }

    // ---- feeds ----

    pub async fn add_feed(&self, def: FeedDefinition) -> Result<()> {
        check_feed(&def)?;
        let mut state = self.state.lock().await;
        if state.settings.feed(&def.name).is_some() {
            return Err(EddyError::DuplicateFeed(def.name));
        }

        let mut next = state.settings.clone();
        next.feeds.push(def.clone());
        self.persist(&next, state.content.table())?;
        state.settings = next;

        info!("Added feed {} ({})", def.name, def.url);
        Ok(())
    }

    pub async fn edit_feed(&self, name: &str, edit: FeedEdit) -> Result<FeedDefinition> {
        let mut state = self.state.lock().await;
        let index = state
            .settings
            .feeds
            .iter()
            .position(|feed| feed.name == name)
            .ok_or_else(|| EddyError::FeedNotFound(name.to_string()))?;

        let old = state.settings.feeds[index].clone();
        let def = edit.apply(&old);
        check_feed(&def)?;
        if def.name != old.name && state.settings.feed(&def.name).is_some() {
            return Err(EddyError::DuplicateFeed(def.name));
        }

        let mut next = state.settings.clone();
        next.feeds[index] = def.clone();

        let restamp = def.name != old.name || def.folder != old.folder;
        let mut table = state.content.table().clone();
        if restamp {
            if let Some(mut content) = table.remove(&old.name) {
                content.restamp(&def);
                table.insert(def.name.clone(), content);
            }
        }
        self.persist(&next, &table)?;
        state.settings = next;

        if restamp {
            state.content.rename(&old.name, &def);
            self.publish(&mut state);
        }

        info!("Edited feed {}", def.name);
        Ok(def)
    }

    pub async fn remove_feed(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.settings.feed(name).is_none() {
            return Err(EddyError::FeedNotFound(name.to_string()));
        }

        let mut next = state.settings.clone();
        next.feeds.retain(|feed| feed.name != name);
        let mut table = state.content.table().clone();
        table.remove(name);
        self.persist(&next, &table)?;
        state.settings = next;

        if state.content.remove(name).is_some() {
            self.publish(&mut state);
        }

        info!("Removed feed {}", name);
        Ok(())
    }

    // ---- filtered folders ----

    pub async fn add_filter(&self, def: FilterDefinition) -> Result<()> {
        def.validate()?;
        let mut state = self.state.lock().await;
        if state.settings.filter(&def.name).is_some() {
            return Err(EddyError::DuplicateFilter(def.name));
        }

        let mut next = state.settings.clone();
        next.filtered.push(def.clone());
        self.commit_settings(&mut state, next)?;

        info!("Added filtered folder {}", def.name);
        Ok(())
    }

    /// Replace the filter called `name` with `def`, keeping its position.
    pub async fn edit_filter(&self, name: &str, def: FilterDefinition) -> Result<()> {
        def.validate()?;
        let mut state = self.state.lock().await;
        let index = state
            .settings
            .filtered
            .iter()
            .position(|filter| filter.name == name)
            .ok_or_else(|| EddyError::FilterNotFound(name.to_string()))?;
        if def.name != name && state.settings.filter(&def.name).is_some() {
            return Err(EddyError::DuplicateFilter(def.name));
        }

        let mut next = state.settings.clone();
        next.filtered[index] = def;
        self.commit_settings(&mut state, next)
    }

    pub async fn remove_filter(&self, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.settings.filter(name).is_none() {
            return Err(EddyError::FilterNotFound(name.to_string()));
        }

        let mut next = state.settings.clone();
        next.filtered.retain(|filter| filter.name != name);
        self.commit_settings(&mut state, next)
    }

    // ---- global options ----

    /// Change the refresh interval. 0 disables automatic refresh.
    pub async fn set_update_interval(&self, minutes: u64) -> Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.settings.clone();
        next.update_time = minutes;
        self.persist(&next, state.content.table())?;
        state.settings = next;

        self.interval.send_replace(minutes);
        info!("Refresh interval set to {} minutes", minutes);
        Ok(())
    }

    // ---- internals ----

    fn persist(&self, settings: &Settings, table: &BTreeMap<String, FeedContent>) -> Result<()> {
        let mut snapshot = settings.clone();
        snapshot.items = table.clone();
        self.store.save(&snapshot.to_blob()?)
    }

    fn commit_settings(&self, state: &mut ReaderState, next: Settings) -> Result<()> {
        self.persist(&next, state.content.table())?;
        state.settings = next;
        self.publish(state);
        Ok(())
    }

    fn commit_contents(&self, state: &mut ReaderState, batch: Vec<FeedContent>) -> Result<()> {
        let mut table = state.content.table().clone();
        for content in &batch {
            table.insert(content.name.clone(), content.clone());
        }
        self.persist(&state.settings, &table)?;
        state.content.replace_all(batch);
        self.publish(state);
        Ok(())
    }

    /// Re-evaluate filtered folders and broadcast the new views.
    fn publish(&self, state: &mut ReaderState) {
        let filtered = Arc::new(filter::evaluate(
            &state.content.items(),
            &state.settings.filtered,
        ));
        state.views = filtered.clone();

        let update = ViewUpdate {
            grouped: Arc::new(state.content.grouped()),
            filtered,
        };
        // Nobody subscribed is not an error.
        let _ = self.updates.send(update);
    }
}

fn check_feed(def: &FeedDefinition) -> Result<()> {
    if def.name.trim().is_empty() {
        return Err(EddyError::Other("feed name must not be empty".into()));
    }
    def.validate()
}

/// Resolve an id or unique id prefix to the full item id.
fn resolve(content: &ContentStore, prefix: &str) -> Result<String> {
    if prefix.is_empty() {
        return Err(EddyError::ItemNotFound(prefix.to_string()));
    }
    let ids: BTreeSet<String> = content
        .find_items(prefix)
        .into_iter()
        .map(|(_, item)| item.id())
        .collect();

    let mut ids = ids.into_iter();
    match (ids.next(), ids.next()) {
        (Some(id), None) => Ok(id),
        (Some(_), Some(_)) => Err(EddyError::AmbiguousItem(prefix.to_string())),
        (None, _) => Err(EddyError::ItemNotFound(prefix.to_string())),
    }
}
