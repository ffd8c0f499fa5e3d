//! Main-body extraction for news article pages.
//!
//! Extraction is a two-pass rule engine over a freshly parsed tree:
//!
//! 1. **Noise removal**: every node matching a noise selector is detached
//!    together with its subtree (scripts, navigation, ad and share widgets,
//!    copyright and related-article blocks).
//! 2. **Candidate probing**: candidate selectors are tried in priority order.
//!    The first match of a selector is flattened to whitespace-normalized
//!    text and accepted if it is longer than `min_text_len` characters.
//!    Probing stops at the first accepted candidate, even when a lower
//!    priority selector would produce more text.
//!
//! When no candidate is accepted the [`FallbackPolicy`] decides between an
//! empty result and the text of the whole (already cleaned) `<body>`.
//!
//! Both selector tables are plain configuration. They are compiled once in
//! [`BodyExtractor::new`], so a bad selector is reported at startup rather
//! than per page.

use crate::encoding::decode_document;
use crate::error::ConfigError;
use crate::models::RawDocument;
use crate::utils::{char_len, normalize_whitespace};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Removed before any candidate is looked at.
pub const DEFAULT_NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "svg",
    "form",
    "header",
    "footer",
    "nav",
    "aside",
    "button",
    "[class*='ad']",
    "[id*='ad']",
    ".sns",
    ".share",
    ".copyright",
    ".related",
    ".recommend",
    ".banner",
    ".byline",
    ".reporter_area",
    ".img_desc",
];

/// Most reliable containers first, generic ones last.
pub const DEFAULT_CANDIDATE_SELECTORS: &[&str] = &[
    "article",
    "#newsct_article",
    ".newsct_article",
    "#dic_area",
    "#newsEndContents",
    ".article_body",
    "#articeBody",
    ".news_end",
    ".article_content",
    ".view_cont",
    ".cont_view",
    ".article_view",
    ".sec_body",
    "#contents",
    "#content",
    ".content",
];

pub const DEFAULT_MIN_TEXT_LEN: usize = 50;

/// What to return when no candidate region is long enough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Return an empty string.
    #[default]
    Empty,
    /// Return the cleaned `<body>` text if it clears the threshold.
    Body,
}

/// Selector tables and acceptance rules for [`BodyExtractor`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub noise_selectors: Vec<String>,
    pub candidate_selectors: Vec<String>,
    /// Accepted text must be strictly longer than this many characters.
    pub min_text_len: usize,
    pub fallback: FallbackPolicy,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            noise_selectors: DEFAULT_NOISE_SELECTORS.iter().map(|s| s.to_string()).collect(),
            candidate_selectors: DEFAULT_CANDIDATE_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            fallback: FallbackPolicy::default(),
        }
    }
}

/// A compiled selector together with its source text for logging.
#[derive(Debug)]
struct SelectorRule {
    pattern: String,
    selector: Selector,
}

impl SelectorRule {
    fn compile(pattern: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(pattern).map_err(|e| ConfigError::Selector {
            selector: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            selector,
        })
    }
}

/// Extracts the main article text from a page.
///
/// Holds no per-call state: one instance can serve any number of concurrent
/// extractions.
#[derive(Debug)]
pub struct BodyExtractor {
    noise: Vec<SelectorRule>,
    candidates: Vec<SelectorRule>,
    body: Selector,
    min_text_len: usize,
    fallback: FallbackPolicy,
}

impl BodyExtractor {
    /// Compile the selector tables of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Selector`] for the first selector that does not
    /// parse.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ConfigError> {
        let noise = config
            .noise_selectors
            .iter()
            .map(|s| SelectorRule::compile(s))
            .collect::<Result<Vec<_>, _>>()?;
        let candidates = config
            .candidate_selectors
            .iter()
            .map(|s| SelectorRule::compile(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            noise,
            candidates,
            body: SelectorRule::compile("body")?.selector,
            min_text_len: config.min_text_len,
            fallback: config.fallback,
        })
    }

    pub fn min_text_len(&self) -> usize {
        self.min_text_len
    }

    /// Decode and extract a fetched page.
    pub fn extract(&self, document: &RawDocument) -> String {
        let html = decode_document(document);
        self.extract_html(&html)
    }

    /// Extract the article body from decoded markup.
    ///
    /// Malformed markup is never an error; the parser recovers and the
    /// heuristics run on whatever tree it produced.
    ///
    /// # Arguments
    ///
    /// * `html` - A complete page or a fragment, already decoded to UTF-8
    ///
    /// # Returns
    ///
    /// Whitespace-normalized text longer than `min_text_len` characters, or
    /// an empty string when nothing clears the threshold.
    pub fn extract_html(&self, html: &str) -> String {
        let mut document = Html::parse_document(html);
        self.strip_noise(&mut document);

        if let Some(text) = self.probe_candidates(&document) {
            return text;
        }

        match self.fallback {
            FallbackPolicy::Empty => {
                debug!("No candidate accepted; returning empty body");
                String::new()
            }
            FallbackPolicy::Body => {
                let text = document
                    .root_element()
                    .select(&self.body)
                    .next()
                    .map(flatten_text)
                    .unwrap_or_default();
                if self.accepts(&text) {
                    debug!(chars = char_len(&text), "No candidate accepted; using body text");
                    text
                } else {
                    debug!("No candidate accepted and body text is too short");
                    String::new()
                }
            }
        }
    }

    /// Detach every noise match from the tree.
    ///
    /// Detached subtrees stay in the arena, so later lookups must start from
    /// [`Html::root_element`] to see only what is still attached.
    fn strip_noise(&self, document: &mut Html) {
        for rule in &self.noise {
            let ids: Vec<_> = document
                .root_element()
                .select(&rule.selector)
                .map(|el| el.id())
                .collect();
            if ids.is_empty() {
                continue;
            }
            trace!(selector = %rule.pattern, count = ids.len(), "Removing noise nodes");
            for id in ids {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }
    }

    fn probe_candidates(&self, document: &Html) -> Option<String> {
        for rule in &self.candidates {
            let Some(element) = document.root_element().select(&rule.selector).next() else {
                continue;
            };
            let text = flatten_text(element);
            if self.accepts(&text) {
                debug!(selector = %rule.pattern, chars = char_len(&text), "Accepted candidate");
                return Some(text);
            }
            trace!(selector = %rule.pattern, chars = char_len(&text), "Candidate below threshold");
        }
        None
    }

    fn accepts(&self, text: &str) -> bool {
        char_len(text) > self.min_text_len
    }
}

fn flatten_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}
