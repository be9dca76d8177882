//! Moby Analytics Tool
//!
//! Natural-language e-commerce analytics questions sent to Triple Whale's
//! Moby endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use super::{http_client, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::safety::mentions_any;

pub const DEFAULT_SHOP_ID: &str = "madisonbraids.myshopify.com";
pub const DEFAULT_QUESTION: &str = "What is triple whale?";
const SENSITIVE_TERMS: &[&str] = &[
    "financial data",
    "customer emails",
    "private information",
    "api keys",
];

/// JSON body for one question; every call starts a fresh conversation
pub fn request_body(question: &str, shop_id: &str, conversation_id: Uuid) -> Value {
    json!({
        "stream": false,
        "shopId": shop_id,
        "conversationId": conversation_id.to_string(),
        "source": "chat",
        "dialect": "clickhouse",
        "userId": "test-user",
        "additionalShopIds": [],
        "question": question,
        "query": question,
        "generateInsights": true,
        "isOutsideMainChat": true,
    })
}

/// Text of the last message in a Moby response
pub fn extract_answer(body: &Value) -> Option<String> {
    body["messages"]
        .as_array()?
        .last()?
        .get("text")?
        .as_str()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn shop_id(params: &Value) -> &str {
    params["shopId"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_SHOP_ID)
}

fn question(params: &Value) -> &str {
    params["question"].as_str().unwrap_or(DEFAULT_QUESTION)
}

pub struct MobyTool {
    client: Client,
    endpoint: String,
}

impl MobyTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
            endpoint: config.moby_endpoint.clone(),
        }
    }

    async fn ask(&self, question: &str, shop_id: &str) -> AgentResult<String> {
        let body = request_body(question, shop_id, Uuid::new_v4());
        info!("Querying Moby for shop {}", shop_id);

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(AgentError::Tool(format!(
                "API request failed with status {}",
                response.status().as_u16()
            )));
        }

        let data: Value = response.json().await?;
        extract_answer(&data).ok_or_else(|| AgentError::Tool("No answer received from Moby".to_string()))
    }
}

#[async_trait]
impl Tool for MobyTool {
    fn name(&self) -> String {
        "moby".to_string()
    }

    fn description(&self) -> String {
        "Get e-commerce analytics and insights from Triple Whale's AI, Moby. Useful for Shopify \
         store analytics, sales data, customer insights, and business metrics."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "question": {
                    "type": "string",
                    "default": DEFAULT_QUESTION,
                    "description": "Question to ask Triple Whale Moby about e-commerce analytics"
                },
                "shopId": {
                    "type": "string",
                    "default": DEFAULT_SHOP_ID,
                    "description": "Shopify store URL"
                }
            }
        })
    }

    fn requires_approval(&self, params: &Value) -> bool {
        mentions_any(question(params), SENSITIVE_TERMS) || shop_id(params) != DEFAULT_SHOP_ID
    }

    fn approval_note(&self) -> Option<String> {
        Some(format!(
            "questions mentioning {}, or any shop other than {}",
            SENSITIVE_TERMS.join(", "),
            DEFAULT_SHOP_ID
        ))
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let question = question(&params).trim();
        let shop_id = shop_id(&params);
        if question.is_empty() {
            return Ok(ToolOutput::failure("Error querying Moby: Question cannot be empty"));
        }

        match self.ask(question, shop_id).await {
            Ok(answer) => {
                let mut text = String::from("🐋 **Triple Whale Moby Analytics**\n\n");
                text.push_str(&format!("❓ **Question:** \"{}\"\n", question));
                if shop_id != DEFAULT_SHOP_ID {
                    text.push_str(&format!("🏪 **Shop ID:** {}\n", shop_id));
                }
                text.push_str(&format!("\n📊 **Moby's Response:**\n{}\n\n", answer));
                text.push_str("💡 *Powered by Triple Whale's AI Analytics*");

                Ok(ToolOutput::success(
                    json!({ "question": question, "shopId": shop_id, "answer": answer }),
                    text,
                ))
            }
            Err(e) => {
                warn!("Moby query failed: {}", e);
                let message = match e {
                    AgentError::Tool(message) => message,
                    _ => "Could not fetch response from Triple Whale".to_string(),
                };
                Ok(ToolOutput::failure(format!("Error querying Moby: {}", message)))
            }
        }
    }
}
