//! Error types for searching, fetching, configuring and collecting.
//!
//! An extraction miss is not represented here: the body extractor returns an
//! empty string when no candidate region is long enough.

use thiserror::Error;

/// Failure of the upstream news search call.
///
/// This is the only error that fails a whole collection.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The topic was empty or whitespace only.
    #[error("search topic must not be empty")]
    EmptyTopic,

    /// The provider could not be reached.
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("search API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The provider payload was not the expected JSON.
    #[error("malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure to obtain a page for extraction.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid article url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("fetch failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("page returned {0}")]
    Status(reqwest::StatusCode),
}

/// Why a single search hit did not become an article.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("search result has no url")]
    EmptyUrl,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no body text above {min_len} characters")]
    NoBody { min_len: usize },
}

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("NAVER_CLIENT_ID and NAVER_CLIENT_SECRET must be set")]
    MissingCredentials,

    #[error("cannot build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
