//! Wikipedia Tool
//!
//! Page summaries from the Wikipedia REST API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{http_client, require_str, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::safety::mentions_any;

const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const SENSITIVE_TOPICS: &[&str] = &["controversial", "political figure", "war crimes", "terrorism"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WikiSummary {
    pub title: Option<String>,
    pub summary: String,
    pub url: Option<String>,
}

impl WikiSummary {
    /// `None` when the page has no extract
    pub fn from_response(body: &Value) -> Option<Self> {
        let summary = body["extract"].as_str().filter(|s| !s.trim().is_empty())?;
        Some(Self {
            title: body["title"].as_str().map(str::to_string),
            summary: summary.to_string(),
            url: body["content_urls"]["desktop"]["page"].as_str().map(str::to_string),
        })
    }

    pub fn render(&self, query: &str) -> String {
        let mut out = String::from("📚 **Wikipedia Summary**\n\n");
        if let Some(title) = &self.title {
            out.push_str(&format!("📖 **Title:** {}\n\n", title));
        }
        out.push_str(&format!("🔍 **Search Query:** \"{}\"\n\n", query));
        out.push_str(&format!("📄 **Summary:**\n{}\n\n", self.summary));
        if let Some(url) = &self.url {
            out.push_str(&format!("🔗 **Read More:** {}\n\n", url));
        }
        out.push_str("📝 *Source: Wikipedia*");
        out
    }
}

/// Page title path segment: spaces become underscores, then percent-encoded
pub fn page_slug(query: &str) -> String {
    urlencoding::encode(&query.replace(' ', "_")).into_owned()
}

pub struct WikipediaTool {
    client: Client,
}

impl WikipediaTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
        }
    }

    async fn lookup(&self, query: &str) -> AgentResult<WikiSummary> {
        let url = format!("{}/{}", SUMMARY_URL, page_slug(query));
        debug!("Fetching Wikipedia summary: {}", url);

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AgentError::Tool(format!(
                    "No Wikipedia page found for \"{}\"",
                    query
                )))
            }
            status if !status.is_success() => {
                return Err(AgentError::Tool(format!(
                    "Wikipedia API returned {}",
                    status.as_u16()
                )))
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        WikiSummary::from_response(&body)
            .ok_or_else(|| AgentError::Tool("No summary found for this topic".to_string()))
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> String {
        "wikipedia".to_string()
    }

    fn description(&self) -> String {
        "Get quick summaries and information from Wikipedia. Useful for looking up facts, \
         definitions, historical information, and general knowledge topics."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The topic to search on Wikipedia" }
            },
            "required": ["query"]
        })
    }

    fn requires_approval(&self, params: &Value) -> bool {
        params["query"]
            .as_str()
            .map(|q| mentions_any(q, SENSITIVE_TOPICS))
            .unwrap_or(false)
    }

    fn approval_note(&self) -> Option<String> {
        Some(format!("topics mentioning {}", SENSITIVE_TOPICS.join(", ")))
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let query = require_str(&params, "query")?.trim();
        if query.is_empty() {
            return Ok(ToolOutput::failure("Error searching Wikipedia: Query cannot be empty"));
        }

        match self.lookup(query).await {
            Ok(summary) => Ok(ToolOutput::success(
                serde_json::to_value(&summary)?,
                summary.render(query),
            )),
            Err(e) => {
                warn!("Wikipedia lookup failed: {}", e);
                let message = match e {
                    AgentError::Tool(message) => message,
                    other => format!("Could not fetch Wikipedia summary - {}", other),
                };
                Ok(ToolOutput::failure(format!("Error searching Wikipedia: {}", message)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug("Rust (programming language)"), "Rust_%28programming_language%29");
        assert_eq!(page_slug("Ada Lovelace"), "Ada_Lovelace");
    }

    #[test]
    fn test_summary_parsing_and_render() {
        let body = json!({
            "title": "Ada Lovelace",
            "extract": "Augusta Ada King was an English mathematician.",
            "content_urls": { "desktop": { "page": "https://en.wikipedia.org/wiki/Ada_Lovelace" } }
        });
        let summary = WikiSummary::from_response(&body).unwrap();
        let text = summary.render("ada lovelace");
        assert!(text.starts_with("📚 **Wikipedia Summary**"));
        assert!(text.contains("📖 **Title:** Ada Lovelace"));
        assert!(text.contains("🔗 **Read More:** https://en.wikipedia.org/wiki/Ada_Lovelace"));
        assert!(text.ends_with("📝 *Source: Wikipedia*"));

        assert!(WikiSummary::from_response(&json!({"title": "Empty"})).is_none());
    }

    #[test]
    fn test_requires_approval() {
        let tool = WikipediaTool::new(&AgentConfig::default());
        assert!(tool.requires_approval(&json!({"query": "Controversial elections"})));
        assert!(tool.requires_approval(&json!({"query": "history of terrorism"})));
        assert!(!tool.requires_approval(&json!({"query": "Photosynthesis"})));
    }
}
