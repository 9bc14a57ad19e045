pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FilterType, SortOrder};

#[derive(Parser)]
#[command(name = "eddy")]
#[command(about = "An RSS/Atom aggregator with filtered folders", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/eddy/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage configured feeds
    Feed {
        #[command(subcommand)]
        action: FeedAction,
    },
    /// Manage filtered folders
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },
    /// Change the state of a single item
    Item {
        #[command(subcommand)]
        action: ItemAction,
    },
    /// List items grouped by folder and feed
    Items {
        /// Only show unread items
        #[arg(short, long)]
        unread: bool,
    },
    /// Fetch all feeds now
    Refresh,
    /// Show or set the refresh interval in minutes (0 disables)
    Interval { minutes: Option<u64> },
    /// Refresh periodically until interrupted
    Watch {
        /// Skip the refresh on start
        #[arg(long)]
        no_initial_refresh: bool,
    },
}

#[derive(Subcommand)]
pub enum FeedAction {
    /// Add a feed
    Add {
        name: String,
        url: String,
        /// Folder label
        #[arg(short, long, default_value = "")]
        folder: String,
    },
    /// Edit a feed; omitted fields stay as they are
    Edit {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Remove a feed and its items
    Remove { name: String },
    /// List feeds
    List,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Filter type: READ, UNREAD, FAVORITES or TAGS
    #[arg(short = 't', long = "type")]
    pub filter_type: FilterType,
    /// Comma-separated folders, or tags for TAGS
    #[arg(short = 'm', long = "match", default_value = "")]
    pub content: String,
    /// ALPHABET_NORMAL, ALPHABET_INVERTED, DATE_NEWEST or DATE_OLDEST
    #[arg(short, long, default_value = "DATE_NEWEST")]
    pub sort: SortOrder,
}

#[derive(Subcommand)]
pub enum FilterAction {
    /// Add a filtered folder
    Add {
        name: String,
        #[command(flatten)]
        args: FilterArgs,
    },
    /// Replace a filtered folder's definition
    Edit {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[command(flatten)]
        args: FilterArgs,
    },
    /// Remove a filtered folder
    Remove { name: String },
    /// List filtered folders
    List,
    /// Show the items a filtered folder currently selects
    Show { name: String },
}

#[derive(Subcommand)]
pub enum ItemAction {
    /// Mark an item read
    Read { id: String },
    /// Mark an item unread
    Unread { id: String },
    /// Mark an item as favorite
    Favorite { id: String },
    /// Remove an item from favorites
    Unfavorite { id: String },
    /// Replace an item's tags
    Tags { id: String, tags: Vec<String> },
    /// Open an item's link in the browser and mark it read
    Open { id: String },
}
