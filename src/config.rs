//! Runtime settings for the collector.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults ([`Settings::default`])
//! 2. an optional YAML file passed with `--config`
//! 3. environment variables and command-line flags (see [`crate::cli`])
//!
//! # Example file
//!
//! ```yaml
//! display: 5
//! sort: date
//! max_articles: 3
//! request_timeout_secs: 10
//! extractor:
//!   min_text_len: 200
//!   fallback: empty
//!   candidate_selectors:
//!     - article
//!     - "#dic_area"
//!     - .story-body
//! ```

use crate::error::ConfigError;
use crate::extractor::ExtractorConfig;
use crate::models::SortOrder;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_SEARCH_URL: &str = "https://openapi.naver.com/v1/search/news.json";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (CollectorBot)";
pub const DEFAULT_REFERER: &str = "https://news.naver.com/";

/// Everything the search adapter, fetcher and extractor need.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `X-Naver-Client-Id` credential.
    pub client_id: String,
    /// `X-Naver-Client-Secret` credential.
    pub client_secret: String,
    pub search_url: String,
    /// Number of search hits requested per topic.
    pub display: usize,
    pub sort: SortOrder,
    /// Upper bound on articles returned by one collection.
    pub max_articles: usize,
    /// Pages fetched at the same time.
    pub concurrency: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Sent with article requests; some portals refuse requests without it.
    pub referer: Option<String>,
    pub extractor: ExtractorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            display: 3,
            sort: SortOrder::Sim,
            max_articles: 3,
            concurrency: 3,
            request_timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: Some(DEFAULT_REFERER.to_string()),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or return the defaults when no path is given.
    ///
    /// Keys missing from the file keep their default values.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}
