pub mod http_fetcher;
pub mod parallel;

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{FeedContent, FeedDefinition};
use crate::normalizer::Normalizer;

/// Raw transport: URL in, body bytes out.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Produces parsed content for a configured feed.
///
/// Items come back with cleared user state; the merge engine restores it.
#[async_trait]
pub trait FeedSource {
    async fn fetch_feed(&self, def: &FeedDefinition) -> Result<FeedContent>;
}

/// [`FeedSource`] that downloads with a [`Fetcher`] and parses with the
/// [`Normalizer`].
pub struct HttpFeedSource {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl HttpFeedSource {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::new(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_feed(&self, def: &FeedDefinition) -> Result<FeedContent> {
        let body = self.fetcher.fetch(&def.url).await?;
        self.normalizer.normalize(def, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EddyError;

    struct StaticFetcher(&'static str);

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            if url.contains("broken") {
                return Err(EddyError::Other(format!("unreachable: {}", url)));
            }
            Ok(self.0.as_bytes().to_vec())
        }
    }

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>T</title>
<item><title>One</title><link>https://example.com/1</link></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_http_source_parses_and_stamps() {
        let source = HttpFeedSource::new(Arc::new(StaticFetcher(RSS)));
        let def = FeedDefinition::new("blog", "https://example.com/feed", "Tech");

        let content = source.fetch_feed(&def).await.unwrap();
        assert_eq!(content.name, "blog");
        assert_eq!(content.items.len(), 1);
        assert_eq!(content.items[0].folder, "Tech");
    }

    #[tokio::test]
    async fn test_http_source_propagates_fetch_error() {
        let source = HttpFeedSource::new(Arc::new(StaticFetcher(RSS)));
        let def = FeedDefinition::new("bad", "https://broken.example.com/feed", "");
        assert!(source.fetch_feed(&def).await.is_err());
    }
}
