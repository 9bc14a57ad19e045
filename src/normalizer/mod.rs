use chrono::Utc;
use feed_rs::model::Entry;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{EddyError, Result};
use crate::domain::{Enclosure, FeedContent, FeedDefinition, FeedItem};

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse a feed document into content for `def`. Items carry the feed
    /// name and folder from `def` and cleared user state.
    pub fn normalize(&self, def: &FeedDefinition, body: &[u8]) -> Result<FeedContent> {
        let feed = parser::parse(body).map_err(|e| EddyError::FeedParse(e.to_string()))?;

        let mut content = FeedContent::new(def);
        content.title = feed.title.map(|t| decode(&t.content));
        content.link = feed.links.first().map(|l| l.href.clone());
        content.description = feed.description.map(|d| decode(&d.content));
        content.image = feed.logo.or(feed.icon).map(|i| i.uri);
        content.fetched_at = Some(Utc::now());
        content.items = feed
            .entries
            .into_iter()
            .map(|entry| to_item(def, entry))
            .collect();

        Ok(content)
    }
}

fn to_item(def: &FeedDefinition, entry: Entry) -> FeedItem {
    let title = entry.title.map(|t| decode(&t.content)).unwrap_or_default();
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();
    let body = entry
        .content
        .and_then(|c| c.body)
        .map(|b| decode(&b))
        .unwrap_or_default();

    let mut item = FeedItem::new(title, link, body);
    item.description = entry.summary.map(|s| decode(&s.content));
    item.creator = entry.authors.first().map(|a| a.name.clone());
    item.category = entry.categories.first().map(|c| c.term.clone());
    item.pub_date = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc));
    item.enclosure = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| {
            c.url.as_ref().map(|url| Enclosure {
                url: url.to_string(),
                mime_type: c.content_type.as_ref().map(|m| m.to_string()),
            })
        });
    item.image = entry
        .media
        .iter()
        .flat_map(|m| m.thumbnails.iter())
        .map(|t| t.image.uri.clone())
        .next();
    item.feed = def.name.clone();
    item.folder = def.folder.clone();
    item
}

fn decode(s: &str) -> String {
    decode_html_entities(s).to_string()
}
