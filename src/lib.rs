//! # Eddy
//!
//! An RSS/Atom aggregator that keeps read, favorite and tag state across
//! refreshes and groups items into user-defined filtered folders.
//!
//! ## Architecture
//!
//! ```text
//! FeedSource → Normalizer → Merge → ContentStore → Filter → views
//!                                        ↓
//!                                  Settings → Store
//! ```
//!
//! - [`fetcher`]: HTTP download and bounded parallel fetching
//! - [`merge`]: carries user state from stored items to freshly fetched ones
//! - [`content`]: in-memory feed content grouped by folder
//! - [`filter`]: evaluates filtered folders
//! - [`settings`]: the persisted blob and its legacy migration
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a feed in a folder
//! eddy feed add rust https://blog.rust-lang.org/feed.xml --folder Tech
//!
//! # Fetch everything
//! eddy refresh
//!
//! # Unread Tech items, oldest first
//! eddy filter add backlog --type UNREAD --match Tech --sort DATE_OLDEST
//! eddy filter show backlog
//!
//! # Keep refreshing on the configured interval
//! eddy watch
//! ```

/// Application context, the [`Reader`](app::Reader) state owner and errors.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Tool configuration loaded from `~/.config/eddy/config.toml`.
pub mod config;

/// In-memory feed content table with change notifications.
pub mod content;

/// Core domain models.
///
/// - [`FeedDefinition`](domain::FeedDefinition): a configured feed
/// - [`FeedContent`](domain::FeedContent): last fetched metadata plus items
/// - [`FeedItem`](domain::FeedItem): one entry with its user state
/// - [`FilterDefinition`](domain::FilterDefinition): a saved filtered folder
pub mod domain;

/// Feed fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): raw HTTP transport
/// - [`FeedSource`](fetcher::FeedSource): fetch and parse one feed
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): bounded concurrent fetching
pub mod fetcher;

/// Filtered folder evaluation and sorting.
pub mod filter;

/// Merge of fresh items with stored user state.
pub mod merge;

/// Feed parsing and normalization.
///
/// Converts RSS and Atom documents into [`FeedContent`](domain::FeedContent).
pub mod normalizer;

/// Periodic refresh.
pub mod scheduler;

/// The persisted settings blob and migration from the legacy layout.
pub mod settings;

/// Blob persistence.
///
/// - [`Store`](store::Store): load/save trait
/// - [`JsonStore`](store::JsonStore): JSON file with atomic replace
/// - [`MemoryStore`](store::MemoryStore): in-memory store
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
