//! Tool System Module
//!
//! Uniform, JSON-schema described tools behind a registry that gates
//! approval, rate limits network tools and caches successful results.

mod analytics;
mod calculator;
mod file_ops;
mod forecast;
mod image_gen;
mod system;
mod time;
mod urban_dictionary;
mod weather;
mod web_search;
mod weekly_report;
mod wikipedia;

pub use analytics::{MobyTool, DEFAULT_SHOP_ID};
pub use calculator::CalculatorTool;
pub use file_ops::FileOperationsTool;
pub use forecast::ForecastTool;
pub use image_gen::ImageGenerationTool;
pub use system::SystemInfoTool;
pub use time::TimeTool;
pub use urban_dictionary::UrbanDictionaryTool;
pub use weather::WeatherTool;
pub use web_search::WebSearchTool;
pub use weekly_report::WeeklyReportTool;
pub use wikipedia::WikipediaTool;

use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::safety::RateLimiter;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolOutput {
    /// Whether the tool execution was successful
    pub success: bool,
    /// The output data (can be string, JSON object, etc.)
    pub data: Value,
    /// Human-readable summary of the output
    pub summary: String,
    /// Optional error message if success is false
    pub error: Option<String>,
}

impl ToolOutput {
    /// Create a successful output
    pub fn success(data: impl Into<Value>, summary: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
            summary: summary.into(),
            error: None,
        }
    }

    /// Create a successful output with string data
    pub fn success_str(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            success: true,
            summary: content.clone(),
            data: Value::String(content),
            error: None,
        }
    }

    /// Create a failed output; the message is shown to the user as-is
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            data: Value::Null,
            summary: error.clone(),
            error: Some(error),
        }
    }
}

/// A request to run one tool
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ToolCall {
    /// Name of the tool to call
    pub name: String,
    /// Parameters for the tool
    #[serde(default)]
    pub parameters: Value,
    /// Whether a human already approved this exact call
    #[serde(default)]
    pub approved: bool,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            parameters,
            approved: false,
        }
    }

    pub fn approved(mut self) -> Self {
        self.approved = true;
        self
    }
}

/// Trait for tools that can be executed through the registry
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the unique name of the tool
    fn name(&self) -> String;

    /// Get a description of what the tool does
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's parameters
    fn parameters(&self) -> Value;

    /// Whether running with these parameters needs human approval
    fn requires_approval(&self, _params: &Value) -> bool {
        false
    }

    /// Short description of when approval is requested, for tool listings
    fn approval_note(&self) -> Option<String> {
        None
    }

    /// Whether successful outputs may be served from the cache
    fn cacheable(&self) -> bool {
        true
    }

    /// Execute the tool with the given parameters
    async fn execute(&self, params: Value) -> AgentResult<ToolOutput>;
}

/// How long a cached output stays valid
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Most outputs the cache holds at once
pub const CACHE_CAPACITY: usize = 256;

struct CachedOutput {
    stored_at: Instant,
    output: ToolOutput,
}

/// Registry for available tools with built-in caching
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
    cache: Arc<Mutex<HashMap<String, CachedOutput>>>,
    cache_ttl: Duration,
    limiter: Mutex<RateLimiter>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::with_rate_limiter(RateLimiter::new())
    }

    pub fn with_rate_limiter(limiter: RateLimiter) -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            cache: Arc::new(Mutex::new(HashMap::new())),
            cache_ttl: CACHE_TTL,
            limiter: Mutex::new(limiter),
        }
    }

    /// Replace the default cache lifetime
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Registry holding every built-in tool
    pub async fn with_default_tools(config: &AgentConfig) -> Self {
        let registry = Self::new();
        registry.register::<ForecastTool>().await;
        registry.register::<CalculatorTool>().await;
        registry.register::<TimeTool>().await;
        registry.register::<SystemInfoTool>().await;
        registry.register::<FileOperationsTool>().await;
        registry.register_instance(WeatherTool::new(config)).await;
        registry.register_instance(WebSearchTool::new(config)).await;
        registry.register_instance(WikipediaTool::new(config)).await;
        registry.register_instance(UrbanDictionaryTool::new(config)).await;
        registry.register_instance(MobyTool::new(config)).await;
        registry.register_instance(ImageGenerationTool::new(config)).await;
        registry.register_instance(WeeklyReportTool::new(config)).await;
        info!("Registered {} tools", registry.tools.read().await.len());
        registry
    }

    /// Register a tool
    pub async fn register<T: Tool + 'static + Default>(&self) {
        self.register_instance(T::default()).await;
    }

    /// Register a tool instance
    pub async fn register_instance<T: Tool + 'static>(&self, tool: T) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name(), Arc::new(tool));
    }

    /// Get all tool names, sorted
    pub async fn tool_names(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Catalog of every tool with its schema
    pub async fn generate_tools_prompt(&self) -> String {
        let tools = self.tools.read().await;
        if tools.is_empty() {
            return "No tools available.\n".to_string();
        }

        let mut names: Vec<_> = tools.keys().collect();
        names.sort();

        let mut prompt = String::from("Available Tools:\n\n");
        for name in names {
            let tool = &tools[name];
            prompt.push_str(&format!(
                "- {}: {} (params: {})\n",
                name,
                tool.description(),
                serde_json::to_string(&tool.parameters()).unwrap_or_default()
            ));
            if let Some(note) = tool.approval_note() {
                prompt.push_str(&format!("  Requires approval: {}\n", note));
            }
        }

        prompt
    }

    /// Get a specific tool by name
    pub async fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// Execute a tool call with approval gating, rate limiting and caching
    pub async fn execute(&self, call: &ToolCall) -> AgentResult<ToolOutput> {
        let tool = match self.get_tool(&call.name).await {
            Some(tool) => tool,
            None => return Ok(ToolOutput::failure(format!("Unknown tool: {}", call.name))),
        };

        if !call.approved && tool.requires_approval(&call.parameters) {
            info!("Tool '{}' held for approval", call.name);
            return Err(AgentError::ApprovalRequired(call.name.clone()));
        }

        let cache_key = format!("{}:{}", call.name, serde_json::to_string(&call.parameters)?);

        if tool.cacheable() {
            let mut cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&cache_key) {
                if entry.stored_at.elapsed() < self.cache_ttl {
                    debug!("Cache Hit for tool: {}", call.name);
                    return Ok(entry.output.clone());
                }
            }
            cache.remove(&cache_key);
        }

        if !self.limiter.lock().await.check_tool(&call.name) {
            warn!("Rate limit reached for tool: {}", call.name);
            return Ok(ToolOutput::failure(format!(
                "Rate limit exceeded for {}. Please try again later.",
                call.name
            )));
        }

        debug!("Executing tool: {}", call.name);
        let result = tool.execute(call.parameters.clone()).await?;

        if result.success && tool.cacheable() {
            let mut cache = self.cache.lock().await;
            if cache.len() >= CACHE_CAPACITY {
                let ttl = self.cache_ttl;
                cache.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            }
            if cache.len() >= CACHE_CAPACITY {
                let oldest = cache
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(key, _)| key.clone());
                if let Some(key) = oldest {
                    cache.remove(&key);
                }
            }
            cache.insert(
                cache_key,
                CachedOutput {
                    stored_at: Instant::now(),
                    output: result.clone(),
                },
            );
        }

        Ok(result)
    }

    /// Execute multiple tool calls in parallel
    pub async fn execute_parallel(&self, calls: &[ToolCall]) -> Vec<AgentResult<ToolOutput>> {
        let futures = calls.iter().map(|call| self.execute(call));
        futures_util::future::join_all(futures).await
    }

    /// Clear the tool cache
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        cache.clear();
    }

    /// Number of cached outputs, expired ones included until evicted
    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Required string parameter
pub(crate) fn require_str<'a>(params: &'a Value, key: &str) -> AgentResult<&'a str> {
    params[key]
        .as_str()
        .ok_or_else(|| AgentError::Validation(format!("Missing required parameter: {}", key)))
}

/// Non-negative integer parameter; accepts integral floats such as `5.0`
pub(crate) fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// HTTP client shared by the network tools of one registry
pub(crate) fn http_client(config: &AgentConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}
