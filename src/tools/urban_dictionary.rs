//! Urban Dictionary Tool
//!
//! Top slang definition for a term. Every lookup needs approval since the
//! content is frequently explicit.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use tracing::warn;

use super::{http_client, require_str, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};

const DEFINE_URL: &str = "https://api.urbandictionary.com/v0/define";

fn link_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\[([^\]]+)\]").ok())
        .as_ref()
}

/// Drop `[linked term]` brackets and normalize CRLF line endings
pub fn clean_text(text: &str) -> String {
    let unlinked = match link_pattern() {
        Some(re) => re.replace_all(text, "$1").into_owned(),
        None => text.to_string(),
    };
    unlinked.replace("\r\n", "\n").trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub word: String,
    pub definition: String,
    pub example: Option<String>,
    pub thumbs_up: i64,
    pub thumbs_down: i64,
    pub author: String,
    pub written_on: Option<String>,
}

impl Definition {
    /// Top entry of a define response, cleaned
    pub fn top_from_response(body: &Value) -> Option<Self> {
        let top = body["list"].as_array()?.first()?;
        Some(Self {
            word: top["word"].as_str().unwrap_or_default().to_string(),
            definition: clean_text(top["definition"].as_str().unwrap_or_default()),
            example: top["example"]
                .as_str()
                .map(clean_text)
                .filter(|e| !e.is_empty()),
            thumbs_up: top["thumbs_up"].as_i64().unwrap_or(0),
            thumbs_down: top["thumbs_down"].as_i64().unwrap_or(0),
            author: top["author"].as_str().unwrap_or("anonymous").to_string(),
            written_on: top["written_on"]
                .as_str()
                .and_then(|w| chrono::DateTime::parse_from_rfc3339(w).ok())
                .map(|d| d.format("%-m/%-d/%Y").to_string()),
        })
    }

    pub fn render(&self, term: &str) -> String {
        let mut out = String::from("🗣️ **Urban Dictionary Lookup**\n\n");
        out.push_str(&format!("🔍 **Search Term:** \"{}\"\n\n", term));
        out.push_str(&format!("**{}**\n\n", self.word));
        out.push_str(&format!("📝 **Definition:** {}\n\n", self.definition));
        if let Some(example) = &self.example {
            out.push_str(&format!("💬 **Example:** {}\n\n", example));
        }
        out.push_str(&format!("👍 {} 👎 {}\n", self.thumbs_up, self.thumbs_down));
        out.push_str(&format!("👤 **By:** {}", self.author));
        if let Some(written) = &self.written_on {
            out.push_str(&format!("\n📅 **Written:** {}", written));
        }
        out.push_str("\n\n⚠️ *Content from Urban Dictionary may contain explicit or offensive material*");
        out
    }
}

pub struct UrbanDictionaryTool {
    client: Client,
}

impl UrbanDictionaryTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
        }
    }

    async fn lookup(&self, term: &str) -> AgentResult<Definition> {
        let response = self
            .client
            .get(DEFINE_URL)
            .query(&[("term", term)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Tool(format!(
                "API request failed with status {}",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        Definition::top_from_response(&body)
            .ok_or_else(|| AgentError::Tool(format!("No definitions found for \"{}\"", term)))
    }
}

#[async_trait]
impl Tool for UrbanDictionaryTool {
    fn name(&self) -> String {
        "urban_dictionary".to_string()
    }

    fn description(&self) -> String {
        "Look up slang definitions and internet culture terms from Urban Dictionary. Useful for \
         understanding modern slang, internet terminology, and pop culture references."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "term": { "type": "string", "description": "The term to look up in Urban Dictionary" }
            },
            "required": ["term"]
        })
    }

    fn requires_approval(&self, _params: &Value) -> bool {
        true
    }

    fn approval_note(&self) -> Option<String> {
        Some("always".to_string())
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let term = require_str(&params, "term")?.trim();
        if term.is_empty() {
            return Ok(ToolOutput::failure(
                "Error looking up Urban Dictionary: Term cannot be empty",
            ));
        }

        match self.lookup(term).await {
            Ok(definition) => Ok(ToolOutput::success(
                serde_json::to_value(&definition)?,
                definition.render(term),
            )),
            Err(e) => {
                warn!("Urban Dictionary lookup failed: {}", e);
                let message = match e {
                    AgentError::Tool(message) => message,
                    _ => "Could not fetch definition from Urban Dictionary".to_string(),
                };
                Ok(ToolOutput::failure(format!(
                    "Error looking up Urban Dictionary: {}",
                    message
                )))
            }
        }
    }
}
