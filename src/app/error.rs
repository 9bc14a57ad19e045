use thiserror::Error;

#[derive(Error, Debug)]
pub enum EddyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings data error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("A feed named {0} already exists")]
    DuplicateFeed(String),

    #[error("Filtered folder not found: {0}")]
    FilterNotFound(String),

    #[error("A filtered folder named {0} already exists")]
    DuplicateFilter(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item id {0} matches more than one item")]
    AmbiguousItem(String),

    #[error("A refresh is already running")]
    RefreshInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EddyError>;
