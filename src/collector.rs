//! Topic-level news collection.
//!
//! A collection runs in three steps:
//!
//! 1. **Search**: one call to the [`SearchProvider`]; its failure is the only
//!    thing that fails the whole collection.
//! 2. **Fetch + extract**: one future per hit, at most `concurrency` in
//!    flight, results kept in search order.
//! 3. **Aggregate**: every hit yields a `Result<ExtractedArticle,
//!    ArticleError>`; failures are logged and dropped, successes are capped
//!    at `max_articles`.
//!
//! A collection with zero articles is a valid result.

use crate::config::Settings;
use crate::error::{ArticleError, ConfigError, SearchError};
use crate::extractor::BodyExtractor;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::models::{ExtractedArticle, NewsCollection, SearchResult, SortOrder};
use crate::search::{NaverSearch, SearchProvider};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

/// Searches, fetches and extracts articles for a topic.
#[derive(Debug)]
pub struct NewsCollector<S, F> {
    search: S,
    fetcher: F,
    extractor: BodyExtractor,
    display: usize,
    sort: SortOrder,
    max_articles: usize,
    concurrency: usize,
}

impl NewsCollector<NaverSearch, HttpFetcher> {
    /// Build the production collector: Naver search, HTTP fetcher, and an
    /// extractor compiled from `settings.extractor`.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(
            NaverSearch::new(settings)?,
            HttpFetcher::new(settings)?,
            BodyExtractor::new(&settings.extractor)?,
            settings,
        ))
    }
}

impl<S, F> NewsCollector<S, F>
where
    S: SearchProvider,
    F: PageFetcher,
{
    pub fn new(search: S, fetcher: F, extractor: BodyExtractor, settings: &Settings) -> Self {
        Self {
            search,
            fetcher,
            extractor,
            display: settings.display,
            sort: settings.sort,
            max_articles: settings.max_articles,
            concurrency: settings.concurrency.max(1),
        }
    }

    /// Collect articles for `topic` with the configured count and order.
    pub async fn collect(&self, topic: &str) -> Result<NewsCollection, SearchError> {
        self.collect_with(topic, self.display, self.sort).await
    }

    /// Collect articles for `topic`, overriding the hit count and order.
    ///
    /// # Arguments
    ///
    /// * `topic` - Free-text topic passed to the search provider
    /// * `count` - Number of search hits to request
    /// * `sort` - Ordering requested from the provider
    ///
    /// # Returns
    ///
    /// At most `max_articles` articles in search order, possibly none.
    ///
    /// # Errors
    ///
    /// Only [`SearchError`]; per-article failures are dropped from the result.
    #[instrument(level = "info", skip(self))]
    pub async fn collect_with(
        &self,
        topic: &str,
        count: usize,
        sort: SortOrder,
    ) -> Result<NewsCollection, SearchError> {
        let hits = self.search.search(topic, count, sort).await?;
        let total = hits.len();

        let outcomes: Vec<Result<ExtractedArticle, ArticleError>> =
            stream::iter(hits.iter().cloned())
                .map(|hit| async move { self.collect_article(&hit).await })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut articles = Vec::new();
        for (hit, outcome) in hits.iter().zip(outcomes) {
            match outcome {
                Ok(article) => {
                    debug!(url = %hit.url, chars = article.text.chars().count(), "Collected article");
                    articles.push(article);
                }
                Err(ArticleError::Fetch(e)) => {
                    warn!(url = %hit.url, error = %e, "Article fetch failed; skipping");
                }
                Err(e) => {
                    info!(url = %hit.url, title = %hit.title, reason = %e, "Skipping article");
                }
            }
        }

        let extracted = articles.len();
        articles.truncate(self.max_articles);
        info!(
            hits = total,
            extracted,
            returned = articles.len(),
            "Collection complete"
        );

        Ok(NewsCollection { articles })
    }

    /// Fetch and extract one search hit.
    ///
    /// # Returns
    ///
    /// The article, or the [`ArticleError`] explaining why the hit was
    /// skipped. A hit without a URL is rejected before any request is made.
    pub async fn collect_article(&self, hit: &SearchResult) -> Result<ExtractedArticle, ArticleError> {
        if hit.url.trim().is_empty() {
            return Err(ArticleError::EmptyUrl);
        }

        let document = self.fetcher.fetch(&hit.url).await?;
        let text = self.extractor.extract(&document);
        if text.is_empty() {
            return Err(ArticleError::NoBody {
                min_len: self.extractor.min_text_len(),
            });
        }

        Ok(ExtractedArticle::from_hit(hit, text))
    }
}
