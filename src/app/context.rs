use std::sync::Arc;

use tracing::debug;

use crate::app::error::{EddyError, Result};
use crate::app::Reader;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::{FeedSource, Fetcher, HttpFeedSource};
use crate::store::{JsonStore, Store};

pub struct AppContext {
    pub config: Config,
    pub reader: Arc<Reader>,
}

impl AppContext {
    /// Wire the JSON store and HTTP source from `config` into a [`Reader`].
    pub fn new(config: Config) -> Result<Self> {
        let settings_path = config
            .settings_path()
            .map_err(|e| EddyError::Config(e.to_string()))?;
        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json_store = JsonStore::new(&settings_path);
        debug!("Settings file: {}", json_store.path().display());
        let store: Arc<dyn Store + Send + Sync> = Arc::new(json_store);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        let source: Arc<dyn FeedSource + Send + Sync> = Arc::new(HttpFeedSource::new(fetcher));

        Self::with_parts(config, store, source)
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn Store + Send + Sync>,
        source: Arc<dyn FeedSource + Send + Sync>,
    ) -> Result<Self> {
        let reader = Arc::new(Reader::load(store, source, config.fetch.workers)?);
        Ok(Self { config, reader })
    }
}
