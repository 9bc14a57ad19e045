use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::app::Result;
use crate::domain::{FeedContent, FeedDefinition};
use crate::fetcher::FeedSource;

pub const DEFAULT_WORKERS: usize = 4;

/// Fetches a batch of feeds with bounded concurrency. Results come back in
/// the order the feeds were given, one per feed, so a failure stays with
/// its own feed.
pub struct ParallelFetcher {
    source: Arc<dyn FeedSource + Send + Sync>,
    workers: usize,
}

impl ParallelFetcher {
    pub fn with_workers(source: Arc<dyn FeedSource + Send + Sync>, workers: usize) -> Self {
        Self {
            source,
            workers: workers.max(1),
        }
    }

    pub async fn fetch_all(
        &self,
        feeds: Vec<FeedDefinition>,
    ) -> Vec<(FeedDefinition, Result<FeedContent>)> {
        let source = &self.source;
        stream::iter(feeds)
            .map(|def| async move {
                let result = source.fetch_feed(&def).await;
                if let Err(e) = &result {
                    tracing::debug!("Fetching {} failed: {}", def.url, e);
                }
                (def, result)
            })
            .buffered(self.workers)
            .collect()
            .await
    }
}
