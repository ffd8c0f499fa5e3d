//! MCP tool server exposing news collection to LLM clients over stdio.
//!
//! One tool is registered:
//!
//! | Tool | Input | Output |
//! |------|-------|--------|
//! | `collect_news` | `{ "topic": string }` | structured `{ "articles": [{ "title", "url", "text" }] }` |
//!
//! Per-article failures only shrink the article list. A failed search is
//! reported as a tool error result so the model can see what went wrong; an
//! empty topic is rejected as invalid parameters.
//!
//! stdout carries the protocol, so all logging must go to stderr.

use crate::collector::NewsCollector;
use crate::fetch::HttpFetcher;
use crate::search::NaverSearch;
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info, instrument};

pub const SERVER_NAME: &str = "naver-news-collector";

const INSTRUCTIONS: &str = "Collects recent Naver News articles for a topic. \
Call `collect_news` with a short topic or keyword phrase; it returns each article's \
title, source URL and extracted body text. Cite the URLs when summarizing.";

/// The production collector shared by every tool call.
pub type SharedCollector = Arc<NewsCollector<NaverSearch, HttpFetcher>>;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CollectNewsArgs {
    /// Topic or keywords to search the news for.
    pub topic: String,
}

#[derive(Clone)]
pub struct NewsServer {
    collector: SharedCollector,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl NewsServer {
    pub fn new(collector: SharedCollector) -> Self {
        Self {
            collector,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search recent news articles about a topic and return their titles, URLs and main body text."
    )]
    async fn collect_news(
        &self,
        Parameters(args): Parameters<CollectNewsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let topic = args.topic.trim();
        if topic.is_empty() {
            return Err(McpError::invalid_params("topic must not be empty", None));
        }

        match self.collector.collect(topic).await {
            Ok(collection) => {
                info!(%topic, count = collection.articles.len(), "collect_news succeeded");
                let payload = serde_json::to_value(&collection)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(collection_result(payload))
            }
            Err(e) => {
                error!(%topic, error = %e, "collect_news failed");
                Ok(CallToolResult::error(vec![Content::text(format!(
                    "News search failed: {e}"
                ))]))
            }
        }
    }
}

/// Structured content for machine consumers plus the same JSON as text for
/// clients that only read `content`.
fn collection_result(payload: serde_json::Value) -> CallToolResult {
    let mut result = CallToolResult::structured(payload.clone());
    result.content = vec![Content::text(payload.to_string())];
    result
}

#[tool_handler]
impl ServerHandler for NewsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

/// Serve the tool over stdin/stdout until the client disconnects.
#[instrument(level = "info", skip_all)]
pub async fn serve_stdio(collector: SharedCollector) -> Result<(), Box<dyn Error>> {
    info!(server = SERVER_NAME, "MCP server starting in stdio mode");
    let running = NewsServer::new(collector).serve(stdio()).await?;
    let reason = running.waiting().await?;
    info!(?reason, "MCP server stopped");
    Ok(())
}
