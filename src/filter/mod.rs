//! Evaluate filtered folders over the item corpus.

use std::cmp::Ordering;

use crate::domain::{FeedItem, FilterDefinition, FilterType, FilteredFolderContent, SortOrder};

/// Produce one view per filter, in definition order.
pub fn evaluate(items: &[FeedItem], filters: &[FilterDefinition]) -> Vec<FilteredFolderContent> {
    filters
        .iter()
        .map(|filter| FilteredFolderContent {
            filter: filter.clone(),
            items: apply(items, filter),
        })
        .collect()
}

/// Matching items for a single filter, sorted by its order.
pub fn apply(items: &[FeedItem], filter: &FilterDefinition) -> Vec<FeedItem> {
    let wanted = filter.content_list();
    let mut matched: Vec<FeedItem> = items
        .iter()
        .filter(|item| matches(item, filter.filter_type, &wanted))
        .cloned()
        .collect();
    sort_items(&mut matched, filter.sort_order);
    matched
}

fn matches(item: &FeedItem, filter_type: FilterType, wanted: &[&str]) -> bool {
    let in_folder = || wanted.is_empty() || wanted.contains(&item.folder.as_str());
    match filter_type {
        FilterType::Read => item.read && in_folder(),
        FilterType::Unread => !item.read && in_folder(),
        FilterType::Favorites => item.favorite && in_folder(),
        FilterType::Tags => item.tags.iter().any(|tag| wanted.contains(&tag.as_str())),
    }
}

/// Stable in-place sort. Undated items count as the oldest.
pub fn sort_items(items: &mut [FeedItem], order: SortOrder) {
    match order {
        SortOrder::AlphabetNormal => items.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOrder::AlphabetInverted => items.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortOrder::DateNewest => items.sort_by(|a, b| b.pub_date.cmp(&a.pub_date)),
        SortOrder::DateOldest => items.sort_by(|a, b| a.pub_date.cmp(&b.pub_date)),
        SortOrder::Unsorted => {}
    }
}

// Case folds first so "apple" and "Banana" sort the way a reader expects.
// Titles equal after folding put the lowercase spelling first.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
