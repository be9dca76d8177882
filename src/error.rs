//! Error types shared by the tool layer

use thiserror::Error;

/// Failures of a tool call itself.
///
/// Domain failures a user should read (bad coordinates, an unknown wiki
/// page) are returned as a failed `ToolOutput` instead.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool '{0}' requires approval for this input")]
    ApprovalRequired(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AgentError::ApprovalRequired("weekly_report".to_string()).to_string(),
            "Tool 'weekly_report' requires approval for this input"
        );
        assert_eq!(
            AgentError::Validation("Missing required parameter: query".to_string()).to_string(),
            "Validation error: Missing required parameter: query"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: AgentError = parse.unwrap_err().into();
        assert!(matches!(err, AgentError::Json(_)));
    }
}
