//! Reconcile freshly fetched items with stored ones.

use std::collections::HashMap;

use crate::domain::{FeedItem, ItemKey};

/// Merge `fresh` items against `previous` ones.
///
/// Fresh items keep their newly fetched fields and take over `read`,
/// `favorite` and `tags` from the previous item with the same
/// (title, link, content). Unmatched fresh items start with cleared state.
/// Previous items the feed no longer lists are dropped. Output order is the
/// order of `fresh`.
pub fn merge(previous: &[FeedItem], fresh: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut known: HashMap<ItemKey<'_>, &FeedItem> = HashMap::with_capacity(previous.len());
    for item in previous {
        known.entry(item.key()).or_insert(item);
    }

    fresh
        .into_iter()
        .map(|mut item| {
            let prior = known.get(&item.key()).copied();
            match prior {
                Some(prior) => item.copy_user_state(prior),
                None => item.reset_user_state(),
            }
            item
        })
        .collect()
}
