//! Mega Agent Toolkit
//!
//! A set of assistant tools behind one uniform, schema-described interface:
//! - Time-series forecasting (linear regression, moving average,
//!   exponential smoothing, confidence bounds)
//! - A safe arithmetic evaluator
//! - Local tools (time, system info, files)
//! - Network tools (weather, search, Wikipedia, Urban Dictionary,
//!   Triple Whale Moby, image generation, GitHub weekly reports)
//! - Per-input approval policies, rate limiting and result caching

pub mod calc;
pub mod config;
pub mod error;
pub mod forecast;
pub mod safety;
pub mod tools;
pub mod utils;

// Re-exports for convenience
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use forecast::{forecast, ForecastError, ForecastResult};
pub use tools::{Tool, ToolCall, ToolOutput, ToolRegistry};
