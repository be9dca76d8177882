//! Runtime configuration
//!
//! API keys, endpoints and directories, read from the process environment.
//! A `.env` file in the working directory is loaded first when present.

use std::path::PathBuf;

pub const DEFAULT_MOBY_ENDPOINT: &str = "http://willy.srv.whale3.io/answer-nlq-question";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Configuration for the tool set
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Visual Crossing key for `get_weather`
    pub visual_crossing_api_key: Option<String>,
    /// OpenAI key for `generate_image`
    pub openai_api_key: Option<String>,
    /// GitHub token for `weekly_report`
    pub github_token: Option<String>,
    /// Triple Whale Moby question endpoint
    pub moby_endpoint: String,
    /// Where generated images are written
    pub uploads_dir: PathBuf,
    /// User agent sent by every HTTP client
    pub user_agent: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            visual_crossing_api_key: None,
            openai_api_key: None,
            github_token: None,
            moby_endpoint: DEFAULT_MOBY_ENDPOINT.to_string(),
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            user_agent: format!("mega_agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AgentConfig {
    /// Load `.env` (if any) and read the environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank values fall back
    /// to the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            visual_crossing_api_key: non_empty(lookup("VISUAL_CROSSING_API_KEY")),
            openai_api_key: non_empty(lookup("OPENAI_API_KEY")),
            github_token: non_empty(lookup("GITHUB_TOKEN")),
            moby_endpoint: non_empty(lookup("MOBY_ENDPOINT")).unwrap_or(defaults.moby_endpoint),
            uploads_dir: non_empty(lookup("MEGA_AGENT_UPLOADS_DIR"))
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            user_agent: defaults.user_agent,
        }
    }
}
