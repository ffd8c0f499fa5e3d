//! Data models passed between the search adapter, the extractor and the
//! tool layer.
//!
//! - [`SearchResult`]: one ranked hit from the news search API
//! - [`RawDocument`]: fetched page bytes, alive for a single extraction
//! - [`ExtractedArticle`]: a hit paired with its extracted body text
//! - [`NewsCollection`]: the structured output of the `collect_news` tool

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Ordering requested from the search provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Relevance ranking.
    #[default]
    Sim,
    /// Most recent first.
    Date,
}

impl SortOrder {
    /// The value the provider expects in its `sort` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Sim => "sim",
            SortOrder::Date => "date",
        }
    }
}

/// A ranked news hit with a cleaned title.
///
/// `url` is empty when the provider supplied neither an original nor a
/// tracking link; such hits are never fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Title with inline tags and HTML entities removed.
    pub title: String,
    /// Canonical article link, falling back to the provider link.
    pub url: String,
    /// Publication time reported by the provider, if it parsed.
    pub published_at: Option<DateTime<FixedOffset>>,
}

/// Page markup exactly as fetched, plus the charset the server declared.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    /// Charset label from the `Content-Type` header, if any.
    pub declared_charset: Option<String>,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>, declared_charset: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            declared_charset,
        }
    }

    /// Wrap an already decoded UTF-8 string.
    pub fn from_html(html: &str) -> Self {
        Self::new(html.as_bytes(), Some("utf-8".to_string()))
    }
}

/// An article whose body text passed the acceptance threshold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub url: String,
    /// Whitespace-normalized body text.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl ExtractedArticle {
    pub fn from_hit(hit: &SearchResult, text: String) -> Self {
        Self {
            title: hit.title.clone(),
            url: hit.url.clone(),
            text,
            published_at: hit.published_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Articles collected for one topic, in search order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsCollection {
    pub articles: Vec<ExtractedArticle>,
}
