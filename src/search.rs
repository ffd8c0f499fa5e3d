//! News search adapter for the Naver News Search API.
//!
//! Turns a topic into a ranked list of [`SearchResult`]s. The provider is
//! called exactly once per search; failures are reported as [`SearchError`]
//! and never retried here.
//!
//! # Response shape
//!
//! ```json
//! { "items": [ { "title": "<b>반도체</b> 수출...", "originallink": "https://...",
//!                "link": "https://n.news.naver.com/...", "pubDate": "Mon, 19 Oct 2026 09:00:00 +0900" } ] }
//! ```

use crate::config::Settings;
use crate::error::{ConfigError, SearchError};
use crate::models::{SearchResult, SortOrder};
use crate::utils::{normalize_whitespace, truncate_for_log};
use chrono::DateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, error, info, instrument};

/// Largest `display` value the provider accepts.
pub const MAX_DISPLAY: usize = 100;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static NUMERIC_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// Source of ranked candidate articles for a topic.
pub trait SearchProvider: Send + Sync {
    /// Return at most `count` hits for `topic`, in provider order.
    fn search(
        &self,
        topic: &str,
        count: usize,
        sort: SortOrder,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    originallink: String,
    #[serde(default)]
    link: String,
    #[serde(default, rename = "pubDate")]
    pub_date: String,
}

/// [`SearchProvider`] backed by the Naver Open API.
#[derive(Clone)]
pub struct NaverSearch {
    client: Client,
    search_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for NaverSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverSearch")
            .field("search_url", &self.search_url)
            .finish_non_exhaustive()
    }
}

impl NaverSearch {
    /// Build the adapter from settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingCredentials`] when either credential is blank,
    /// [`ConfigError::Http`] when the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        if !settings.has_credentials() {
            return Err(ConfigError::MissingCredentials);
        }
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            search_url: settings.search_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
        })
    }
}

impl SearchProvider for NaverSearch {
    #[instrument(level = "info", skip(self))]
    async fn search(
        &self,
        topic: &str,
        count: usize,
        sort: SortOrder,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SearchError::EmptyTopic);
        }
        if count == 0 {
            return Ok(Vec::new());
        }
        let display = count.min(MAX_DISPLAY);

        let url = format!(
            "{}?query={}&display={}&sort={}",
            self.search_url,
            urlencoding::encode(topic),
            display,
            sort.as_param()
        );
        debug!(%url, "Querying news search API");

        let response = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %truncate_for_log(&body, 300), "News search API rejected request");
            return Err(SearchError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let bytes = response.bytes().await?;
        let payload: SearchPayload = serde_json::from_slice(&bytes)?;
        let results = into_results(payload.items, display);

        info!(count = results.len(), "Search returned results");
        Ok(results)
    }
}

/// Map provider items to results, keeping provider order.
///
/// Hits sharing a URL are collapsed to the first one; hits without any URL
/// are kept so callers can see them, but they are never fetched.
fn into_results(items: Vec<SearchItem>, limit: usize) -> Vec<SearchResult> {
    items
        .into_iter()
        .map(|item| {
            let url = [item.originallink, item.link]
                .into_iter()
                .map(|link| link.trim().to_string())
                .find(|link| !link.is_empty())
                .unwrap_or_default();
            SearchResult {
                title: clean_title(&item.title),
                url,
                published_at: DateTime::parse_from_rfc2822(item.pub_date.trim()).ok(),
            }
        })
        .enumerate()
        .unique_by(|(i, hit)| (hit.url.is_empty().then_some(*i), hit.url.clone()))
        .map(|(_, hit)| hit)
        .take(limit)
        .collect()
}

/// Strip inline tags (the provider wraps matched terms in `<b>`) and decode
/// the HTML entities that show up in titles.
///
/// # Arguments
///
/// * `raw` - Title exactly as the provider returned it
///
/// # Returns
///
/// Plain text with whitespace collapsed. `&amp;` is decoded last, so
/// `&amp;lt;` becomes the literal `&lt;`.
pub fn clean_title(raw: &str) -> String {
    let without_tags = TAG.replace_all(raw, "");
    let decoded = NUMERIC_ENTITY.replace_all(&without_tags, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let decoded = decoded
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    normalize_whitespace(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn settings_for(server: &Server) -> Settings {
        Settings {
            client_id: "test-id".to_string(),
            client_secret: "test-secret".to_string(),
            search_url: format!("{}/v1/search/news.json", server.url()),
            ..Settings::default()
        }
    }

    const BODY: &str = r#"{
        "lastBuildDate": "Mon, 19 Oct 2026 10:00:00 +0900",
        "total": 1200,
        "start": 1,
        "display": 3,
        "items": [
            {
                "title": "<b>반도체</b> 수출 &quot;역대 최대&quot;",
                "originallink": "https://news.example.co.kr/article/1",
                "link": "https://n.news.naver.com/mnews/article/001/0000000001",
                "description": "...",
                "pubDate": "Mon, 19 Oct 2026 09:00:00 +0900"
            },
            {
                "title": "AI &amp; <b>반도체</b> 전망",
                "originallink": "",
                "link": "https://n.news.naver.com/mnews/article/002/0000000002",
                "pubDate": "not a date"
            },
            {
                "title": "링크 없는 기사"
            }
        ]
    }"#;

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("<b>Rust</b> 1.90 released"), "Rust 1.90 released");
        assert_eq!(clean_title("&quot;Quoted&quot; &amp; more"), "\"Quoted\" & more");
        assert_eq!(clean_title("It&#39;s &#x41;&#66;C"), "It's ABC");
        assert_eq!(clean_title("&amp;lt; stays literal"), "&lt; stays literal");
        assert_eq!(clean_title("  spaced \n title "), "spaced title");
    }

    #[test]
    fn test_into_results_prefers_original_link_and_dedupes() {
        let items = vec![
            SearchItem {
                title: "one".to_string(),
                originallink: "https://a.example/1".to_string(),
                link: "https://naver.example/1".to_string(),
                pub_date: String::new(),
            },
            SearchItem {
                title: "dup".to_string(),
                originallink: String::new(),
                link: "https://a.example/1".to_string(),
                pub_date: String::new(),
            },
            SearchItem {
                title: "no link".to_string(),
                originallink: String::new(),
                link: String::new(),
                pub_date: String::new(),
            },
            SearchItem {
                title: "no link either".to_string(),
                originallink: " ".to_string(),
                link: String::new(),
                pub_date: String::new(),
            },
        ];

        let results = into_results(items, 10);
        let titles: Vec<_> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["one", "no link", "no link either"]);
        assert_eq!(results[0].url, "https://a.example/1");
        assert!(results[1].url.is_empty());
    }

    #[tokio::test]
    async fn test_search_maps_items() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/search/news.json")
            .match_header("X-Naver-Client-Id", "test-id")
            .match_header("X-Naver-Client-Secret", "test-secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "반도체 수출".into()),
                Matcher::UrlEncoded("display".into(), "3".into()),
                Matcher::UrlEncoded("sort".into(), "date".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let search = NaverSearch::new(&settings_for(&server)).unwrap();
        let results = search.search(" 반도체 수출 ", 3, SortOrder::Date).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "반도체 수출 \"역대 최대\"");
        assert_eq!(results[0].url, "https://news.example.co.kr/article/1");
        assert!(results[0].published_at.is_some());
        assert_eq!(results[1].title, "AI & 반도체 전망");
        assert_eq!(results[1].url, "https://n.news.naver.com/mnews/article/002/0000000002");
        assert!(results[1].published_at.is_none());
        assert_eq!(results[2].url, "");
        for result in &results {
            assert!(!result.title.contains('<'));
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_respects_count() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/search/news.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(BODY)
            .create_async()
            .await;

        let search = NaverSearch::new(&settings_for(&server)).unwrap();
        let results = search.search("반도체", 2, SortOrder::Sim).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_search_non_success_status_is_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/search/news.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"errorMessage":"Authentication failed","errorCode":"024"}"#)
            .expect(1)
            .create_async()
            .await;

        let search = NaverSearch::new(&settings_for(&server)).unwrap();
        let err = search.search("topic", 3, SortOrder::Sim).await.unwrap_err();

        match err {
            SearchError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Authentication failed"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        // Exactly one request: failures are not retried.
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_malformed_payload_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/search/news.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let search = NaverSearch::new(&settings_for(&server)).unwrap();
        let err = search.search("topic", 3, SortOrder::Sim).await.unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_search_rejects_empty_topic() {
        let server = Server::new_async().await;
        let search = NaverSearch::new(&settings_for(&server)).unwrap();
        let err = search.search("   ", 3, SortOrder::Sim).await.unwrap_err();
        assert!(matches!(err, SearchError::EmptyTopic));
    }

    #[test]
    fn test_missing_credentials() {
        let err = NaverSearch::new(&Settings::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }
}
