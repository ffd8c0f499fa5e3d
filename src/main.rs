//! # News Collector
//!
//! Collects news articles about a topic and hands them to LLM tool-calling
//! clients. A topic is searched through the Naver News Search API, each hit's
//! page is fetched, and the main article body is extracted with a
//! selector-table heuristic.
//!
//! ## Usage
//!
//! ```sh
//! news_collector serve                      # MCP tool server on stdio
//! news_collector collect "반도체 수출"        # one-shot, JSON to stdout
//! news_collector extract https://...        # body text of a single page
//! ```
//!
//! ## Architecture
//!
//! 1. **Search**: topic → ranked `(title, url)` hits ([`search`])
//! 2. **Fetch**: raw page bytes with declared charset ([`fetch`])
//! 3. **Extract**: noise removal + candidate probing ([`extractor`])
//! 4. **Collect**: bounded fan-out and partial results ([`collector`])
//! 5. **Serve**: the `collect_news` MCP tool ([`server`])

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collector;
mod config;
mod encoding;
mod error;
mod extractor;
mod fetch;
mod models;
mod search;
mod server;
mod utils;

use cli::{Cli, Command};
use collector::NewsCollector;
use config::Settings;
use extractor::BodyExtractor;
use fetch::{HttpFetcher, PageFetcher};
use utils::truncate_for_log;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr: stdout belongs to the MCP transport) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }

    let args = Cli::parse();
    debug!(?args.config, ?args.command, "Parsed CLI arguments");

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply_to(&mut settings);

    match &args.command {
        Command::Serve => {
            let collector = match NewsCollector::from_settings(&settings) {
                Ok(collector) => collector,
                Err(e) => {
                    error!(error = %e, "Cannot start MCP server");
                    return Err(e.into());
                }
            };
            server::serve_stdio(Arc::new(collector)).await?;
        }
        Command::Collect { topic, .. } => {
            let collector = NewsCollector::from_settings(&settings)?;
            let start_time = std::time::Instant::now();
            let collection = collector.collect(topic).await?;
            info!(
                count = collection.articles.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Collected articles"
            );
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
        Command::Extract { url } => {
            let fetcher = HttpFetcher::new(&settings)?;
            let extractor = BodyExtractor::new(&settings.extractor)?;
            let document = fetcher.fetch(url).await?;
            let text = extractor.extract(&document);
            if text.is_empty() {
                warn!(%url, min_text_len = extractor.min_text_len(), "No article body found");
            } else {
                info!(%url, chars = text.chars().count(), preview = %truncate_for_log(&text, 80), "Extracted article body");
                println!("{text}");
            }
        }
    }

    Ok(())
}
