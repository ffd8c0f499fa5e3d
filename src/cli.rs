//! Command-line interface definitions for News Collector.
//!
//! Global options override values from the optional YAML settings file.
//! Credentials are normally taken from the environment (or a `.env` file).

use crate::config::Settings;
use crate::extractor::FallbackPolicy;
use crate::models::SortOrder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the News Collector application.
///
/// # Examples
///
/// ```sh
/// # Serve the collect_news tool to an MCP client over stdio
/// news_collector serve
///
/// # Collect articles once and print them as JSON
/// news_collector collect "반도체 수출" --display 5 --sort date
///
/// # Check what the extractor finds on a single page
/// news_collector --min-text-len 200 extract https://n.news.naver.com/mnews/article/001/0000000001
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Naver Open API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true, global = true)]
    pub client_id: Option<String>,

    /// Naver Open API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// Minimum article body length, in characters
    #[arg(long, env = "NEWS_MIN_TEXT_LEN", global = true)]
    pub min_text_len: Option<usize>,

    /// What to return when no content container is long enough
    #[arg(long, value_enum, global = true)]
    pub fallback: Option<FallbackPolicy>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "NEWS_REQUEST_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// User-Agent sent when fetching article pages
    #[arg(long, env = "NEWS_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the MCP tool server on stdin/stdout
    Serve,

    /// Collect articles for a topic and print them as JSON
    Collect {
        /// Topic or keywords to search for
        topic: String,

        /// Number of search results to request
        #[arg(short, long)]
        display: Option<usize>,

        /// Result ordering
        #[arg(short, long, value_enum)]
        sort: Option<SortOrder>,
    },

    /// Fetch one page and print its extracted body text
    Extract {
        /// Article URL
        url: String,
    },
}

impl Cli {
    /// Apply command-line and environment overrides on top of `settings`.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(id) = &self.client_id {
            settings.client_id = id.clone();
        }
        if let Some(secret) = &self.client_secret {
            settings.client_secret = secret.clone();
        }
        if let Some(min_text_len) = self.min_text_len {
            settings.extractor.min_text_len = min_text_len;
        }
        if let Some(fallback) = self.fallback {
            settings.extractor.fallback = fallback;
        }
        if let Some(timeout) = self.timeout {
            settings.request_timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Command::Collect { display, sort, .. } = &self.command {
            if let Some(display) = display {
                settings.display = *display;
            }
            if let Some(sort) = sort {
                settings.sort = *sort;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_collect_parsing() {
        let cli = Cli::parse_from([
            "news_collector",
            "collect",
            "반도체 수출",
            "--display",
            "5",
            "--sort",
            "date",
        ]);

        assert_eq!(
            cli.command,
            Command::Collect {
                topic: "반도체 수출".to_string(),
                display: Some(5),
                sort: Some(SortOrder::Date),
            }
        );
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "news_collector",
            "extract",
            "https://example.com/a",
            "--min-text-len",
            "200",
            "--fallback",
            "body",
        ]);

        assert_eq!(cli.min_text_len, Some(200));
        assert_eq!(cli.fallback, Some(FallbackPolicy::Body));
        assert_eq!(
            cli.command,
            Command::Extract {
                url: "https://example.com/a".to_string()
            }
        );
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "news_collector",
            "--client-id",
            "id",
            "--client-secret",
            "secret",
            "--timeout",
            "5",
            "--user-agent",
            "TestBot/1.0",
            "collect",
            "economy",
            "-d",
            "4",
        ]);
        let mut settings = Settings::default();
        cli.apply_to(&mut settings);

        assert!(settings.has_credentials());
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.user_agent, "TestBot/1.0");
        assert_eq!(settings.display, 4);
        assert_eq!(settings.sort, SortOrder::Sim);
    }

    #[test]
    fn test_serve_parsing() {
        let cli = Cli::parse_from(["news_collector", "serve"]);
        assert_eq!(cli.command, Command::Serve);
    }
}
