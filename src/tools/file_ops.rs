//! File Operations Tool
//!
//! Read, write and list local files. Writes and sensitive paths are gated
//! behind approval.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{info, warn};

use super::{require_str, Tool, ToolOutput};
use crate::error::AgentResult;
use crate::safety::{is_sensitive_path, SENSITIVE_PATHS};
use crate::utils::{truncate_text, TruncationPolicy};

/// Largest file body echoed into the summary
const READ_PREVIEW: TruncationPolicy = TruncationPolicy::Bytes(16 * 1024);

#[derive(Default)]
pub struct FileOperationsTool;

impl FileOperationsTool {
    async fn read(&self, path: &Path) -> std::io::Result<(Value, String)> {
        let content = tokio::fs::read_to_string(path).await?;
        let summary = format!(
            "Content of {}:\n{}",
            path.display(),
            truncate_text(&content, READ_PREVIEW)
        );
        Ok((json!({ "content": content, "bytes": content.len() }), summary))
    }

    async fn write(&self, path: &Path, content: &str) -> std::io::Result<(Value, String)> {
        tokio::fs::write(path, content).await?;
        Ok((
            json!({ "bytes_written": content.len() }),
            format!("Successfully wrote content to {}", path.display()),
        ))
    }

    async fn list(&self, path: &Path) -> std::io::Result<(Value, String)> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();

        let summary = format!("Contents of {}:\n{}", path.display(), names.join("\n"));
        Ok((json!({ "entries": names }), summary))
    }
}

#[async_trait]
impl Tool for FileOperationsTool {
    fn name(&self) -> String {
        "file_operations".to_string()
    }

    fn description(&self) -> String {
        "Read, write, or list files and directories".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["read", "write", "list"],
                    "description": "The file operation to perform"
                },
                "filepath": {
                    "type": "string",
                    "description": "Path to the file or directory"
                },
                "content": {
                    "type": "string",
                    "default": "",
                    "description": "Content to write (only for write operation)"
                }
            },
            "required": ["operation", "filepath"]
        })
    }

    fn requires_approval(&self, params: &Value) -> bool {
        if params["operation"].as_str() == Some("write") {
            return true;
        }
        params["filepath"]
            .as_str()
            .map(is_sensitive_path)
            .unwrap_or(false)
    }

    fn approval_note(&self) -> Option<String> {
        Some(format!("writes, or paths containing {}", SENSITIVE_PATHS.join(", ")))
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let operation = require_str(&params, "operation")?;
        let filepath = require_str(&params, "filepath")?;
        let content = params["content"].as_str().unwrap_or("");
        let path = Path::new(filepath);

        info!("FileOperationsTool: {} {}", operation, filepath);

        let result = match operation {
            "read" => self.read(path).await,
            "write" => {
                if content.trim().is_empty() {
                    return Ok(ToolOutput::failure(format!(
                        "Error performing write on {}: Content is required for write operation",
                        filepath
                    )));
                }
                self.write(path, content).await
            }
            "list" => self.list(path).await,
            other => {
                return Ok(ToolOutput::failure(format!(
                    "Error performing {} on {}: Invalid operation",
                    other, filepath
                )))
            }
        };

        match result {
            Ok((data, summary)) => Ok(ToolOutput::success(data, summary)),
            Err(e) => {
                warn!("File operation failed: {}", e);
                Ok(ToolOutput::failure(format!(
                    "Error performing {} on {}: {}",
                    operation, filepath, e
                )))
            }
        }
    }
}
