use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ZoteroError>;

#[derive(Debug, Error)]
pub enum ZoteroError {
    #[error("invalid Zotero API URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Zotero API returned {status} for {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("Zotero item {key} not found")]
    ItemNotFound { key: String },

    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Zotero API kept returning {status} for {url} after {attempts} attempts")]
    RetriesExhausted {
        status: StatusCode,
        url: String,
        attempts: u32,
    },
}

impl ZoteroError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ZoteroError::ItemNotFound { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{0} is not a Zotero collection")]
    CollectionNotFound(String),

    #[error("collection path is empty")]
    EmptyCollectionPath,
}
