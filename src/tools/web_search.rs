//! Web Search Tool
//!
//! Performs web searches using the DuckDuckGo HTML endpoint (no API key required).

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{http_client, require_str, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::safety::mentions_any;

const SENSITIVE_TERMS: &[&str] = &["personal information", "private data", "passwords"];
const DEFAULT_RESULTS: u64 = 5;
const MAX_RESULTS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Web search tool using DuckDuckGo
pub struct WebSearchTool {
    client: Client,
}

impl WebSearchTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
        }
    }

    async fn search_ddg(&self, query: &str, num_results: usize) -> AgentResult<Vec<SearchResult>> {
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}",
            urlencoding::encode(query)
        );

        debug!("Searching DuckDuckGo: {}", query);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Tool(format!(
                "Search request failed with status {}",
                response.status().as_u16()
            )));
        }

        let html = response.text().await?;
        Ok(parse_ddg_html(&html, num_results))
    }
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text.trim()).to_string()
}

/// Pull titles, snippets and URLs out of a DuckDuckGo HTML results page
pub fn parse_ddg_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    let (Ok(snippet_re), Ok(title_re), Ok(url_re)) = (
        Regex::new(r#"class="result__snippet"[^>]*>([^<]+)"#),
        Regex::new(r#"class="result__a"[^>]*>([^<]+)"#),
        Regex::new(r#"class="result__url"[^>]*>([^<]+)"#),
    ) else {
        return Vec::new();
    };

    let capture = |re: &Regex| -> Vec<String> {
        re.captures_iter(html)
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect()
    };

    let titles = capture(&title_re);
    let snippets = capture(&snippet_re);
    let urls = capture(&url_re);

    titles
        .iter()
        .zip(snippets.iter())
        .enumerate()
        .map(|(i, (title, snippet))| SearchResult {
            title: decode(title),
            snippet: decode(snippet),
            url: urls.get(i).map(|u| u.trim().to_string()).unwrap_or_default(),
        })
        .filter(|r| !r.title.is_empty() && !r.snippet.is_empty())
        .take(max_results)
        .collect()
}

/// Numbered result list under a header
pub fn render_results(query: &str, results: &[SearchResult]) -> String {
    let mut out = format!("🔍 Search Results for: \"{}\"\n\n", query);
    if results.is_empty() {
        out.push_str("No results found.");
        return out;
    }

    out.push_str(&format!("📊 **Sources:** ({} found)\n", results.len()));
    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!("{}. **{}**\n", i + 1, r.title));
        if !r.url.is_empty() {
            out.push_str(&format!("   🔗 {}\n", r.url));
        }
        out.push_str(&format!("   📝 {}\n\n", r.snippet));
    }
    out.trim_end().to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> String {
        "search".to_string()
    }

    fn description(&self) -> String {
        "Search the web or perform general search queries. Use this when you need current \
         information, facts, or data."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to execute"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default: 5, max: 10)",
                    "default": DEFAULT_RESULTS
                }
            },
            "required": ["query"]
        })
    }

    fn requires_approval(&self, params: &Value) -> bool {
        params["query"]
            .as_str()
            .map(|q| mentions_any(q, SENSITIVE_TERMS))
            .unwrap_or(false)
    }

    fn approval_note(&self) -> Option<String> {
        Some(format!("queries mentioning {}", SENSITIVE_TERMS.join(", ")))
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let query = require_str(&params, "query")?.trim();
        if query.is_empty() {
            return Ok(ToolOutput::failure(
                "Error performing search: Search query cannot be empty",
            ));
        }

        let num_results = params["num_results"]
            .as_u64()
            .unwrap_or(DEFAULT_RESULTS)
            .clamp(1, MAX_RESULTS) as usize;

        match self.search_ddg(query, num_results).await {
            Ok(results) => Ok(ToolOutput::success(
                json!({
                    "query": query,
                    "num_results": results.len(),
                    "results": results,
                }),
                render_results(query, &results),
            )),
            Err(e) => {
                warn!("Web search failed: {}", e);
                Ok(ToolOutput::failure(format!("Error performing search: {}", e)))
            }
        }
    }
}
