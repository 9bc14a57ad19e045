pub mod feed;
pub mod filter;
pub mod item;

pub use feed::{FeedContent, FeedDefinition, FeedEdit};
pub use filter::{FilterDefinition, FilterType, FilteredFolderContent, SortOrder};
pub use item::{validate_tag, Enclosure, FeedItem, ItemKey};
