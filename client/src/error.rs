use std::sync::Arc;

use common::browse_query::PageDirection;
use thiserror::Error;

/// Clone so a single failed in-flight request can be handed to every caller
/// waiting on it.
#[derive(Error, Debug, Clone)]
pub enum BrowseError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    #[error("JSON deserialization failed: {0}")]
    Decode(#[source] Arc<serde_json::Error>),

    #[error("Unknown search index: {0}")]
    UnknownSearchIndex(String),

    #[error("No {0} anchor in the last result")]
    MissingAnchor(PageDirection),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BrowseError {
    fn from(err: reqwest::Error) -> Self {
        BrowseError::Transport(Arc::new(err))
    }
}

impl From<serde_json::Error> for BrowseError {
    fn from(err: serde_json::Error) -> Self {
        BrowseError::Decode(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;
