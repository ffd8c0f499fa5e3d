//! Article page fetching.
//!
//! The fetcher only moves bytes: it resolves nothing about encoding beyond
//! reading the charset the server declared, and it never retries. A failed
//! fetch means the article is dropped from the batch.

use crate::config::Settings;
use crate::error::{ConfigError, FetchError};
use crate::models::RawDocument;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, redirect};
use std::future::Future;
use tracing::{debug, instrument, warn};
use url::Url;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// Retrieves the raw markup of an article page.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<RawDocument, FetchError>> + Send;
}

/// [`PageFetcher`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher using the user agent, referer and timeout in `settings`.
    pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        if let Some(referer) = settings.referer.as_deref() {
            match HeaderValue::from_str(referer) {
                Ok(value) => {
                    headers.insert(header::REFERER, value);
                }
                Err(e) => warn!(%referer, error = %e, "Ignoring invalid referer"),
            }
        }

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        let parsed = parse_article_url(url)?;

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let declared_charset = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);
        let bytes = response.bytes().await?;

        debug!(bytes = bytes.len(), ?declared_charset, "Fetched article page");
        Ok(RawDocument::new(bytes.to_vec(), declared_charset))
    }
}

/// Only absolute http(s) URLs are fetched.
///
/// # Errors
///
/// [`FetchError::InvalidUrl`] for relative, unparsable or non-http(s) URLs.
pub fn parse_article_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Pull the `charset` parameter out of a `Content-Type` value.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&Settings::default()).unwrap()
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/html; charset=EUC-KR").as_deref(),
            Some("EUC-KR")
        );
        assert_eq!(
            charset_from_content_type("text/html;charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
        assert_eq!(charset_from_content_type("text/html; charset="), None);
    }

    #[test]
    fn test_parse_article_url() {
        assert!(parse_article_url("https://news.example.com/a/1").is_ok());
        assert!(matches!(
            parse_article_url(""),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_article_url("ftp://news.example.com/a"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_article_url("/relative/path"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent_and_reads_charset() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/article/1")
            .match_header("user-agent", "Mozilla/5.0 (CollectorBot)")
            .match_header("referer", "https://news.naver.com/")
            .with_status(200)
            .with_header("content-type", "text/html; charset=euc-kr")
            .with_body(b"<html></html>".to_vec())
            .create_async()
            .await;

        let document = fetcher()
            .fetch(&format!("{}/article/1", server.url()))
            .await
            .unwrap();

        assert_eq!(document.declared_charset.as_deref(), Some("euc-kr"));
        assert_eq!(document.bytes, b"<html></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher()
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(status) if status.as_u16() == 404));
    }
}
