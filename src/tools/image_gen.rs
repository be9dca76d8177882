//! Image Generation Tool
//!
//! Text-to-image through the OpenAI images API; results are written as PNG
//! files under the uploads directory.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use super::{http_client, require_str, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::safety::mentions_any;

const IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const IMAGE_MODEL: &str = "dall-e-3";
const IMAGE_SIZE: &str = "1024x1024";
const INAPPROPRIATE_TERMS: &[&str] = &["nude", "violence", "explicit", "nsfw"];

/// Decode the first `b64_json` image of an images response
pub fn decode_image(body: &Value) -> AgentResult<Vec<u8>> {
    let encoded = body["data"]
        .as_array()
        .and_then(|d| d.first())
        .and_then(|img| img["b64_json"].as_str())
        .ok_or_else(|| AgentError::Tool("No image data received from OpenAI".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| AgentError::Tool(format!("Invalid image data: {}", e)))
}

/// Write `bytes` as `<dir>/<uuid>.png`, creating `dir` if needed
pub async fn save_png(dir: &Path, bytes: &[u8]) -> AgentResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.png", Uuid::new_v4()));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

pub struct ImageGenerationTool {
    client: Client,
    api_key: Option<String>,
    uploads_dir: PathBuf,
}

impl ImageGenerationTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
            api_key: config.openai_api_key.clone(),
            uploads_dir: config.uploads_dir.clone(),
        }
    }

    async fn generate(&self, prompt: &str) -> AgentResult<PathBuf> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".to_string()))?;

        info!("Generating image ({} chars of prompt)", prompt.len());

        let response = self
            .client
            .post(IMAGES_URL)
            .bearer_auth(api_key)
            .json(&json!({
                "model": IMAGE_MODEL,
                "prompt": prompt,
                "n": 1,
                "size": IMAGE_SIZE,
                "response_format": "b64_json",
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AgentError::Tool(format!(
                "OpenAI images API returned {}",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        let bytes = decode_image(&body)?;
        save_png(&self.uploads_dir, &bytes).await
    }
}

#[async_trait]
impl Tool for ImageGenerationTool {
    fn name(&self) -> String {
        "generate_image".to_string()
    }

    fn description(&self) -> String {
        "Generate images based on text prompts using AI".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "Prompt for the image generation" }
            },
            "required": ["prompt"]
        })
    }

    fn requires_approval(&self, params: &Value) -> bool {
        params["prompt"]
            .as_str()
            .map(|p| mentions_any(p, INAPPROPRIATE_TERMS))
            .unwrap_or(false)
    }

    fn approval_note(&self) -> Option<String> {
        Some(format!("prompts mentioning {}", INAPPROPRIATE_TERMS.join(", ")))
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let prompt = require_str(&params, "prompt")?.trim();
        if prompt.is_empty() {
            return Ok(ToolOutput::failure(
                "Error generating image: Image generation prompt cannot be empty",
            ));
        }

        match self.generate(prompt).await {
            Ok(path) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let full_path = tokio::fs::canonicalize(&path)
                    .await
                    .unwrap_or_else(|_| path.clone());

                let text = format!(
                    "🎨 **Image Generated Successfully!**\n\n📝 **Prompt:** \"{}\"\n🖼️ **Image saved to:** /uploads/{}\n📁 **Full path:** {}\n\nYour image has been generated and saved locally. You can find it in the uploads directory.",
                    prompt,
                    file_name,
                    full_path.display()
                );
                Ok(ToolOutput::success(
                    json!({ "image": format!("/uploads/{}", file_name), "path": full_path }),
                    text,
                ))
            }
            Err(e) => {
                warn!("Image generation failed: {}", e);
                Ok(ToolOutput::failure(format!("Error generating image: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use tempfile::tempdir;

    #[test]
    fn test_decode_image() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"\x89PNG data");
        let body = json!({"data": [{"b64_json": encoded}]});
        assert_eq!(decode_image(&body).unwrap(), b"\x89PNG data".to_vec());

        assert!(decode_image(&json!({"data": []})).is_err());
        assert!(decode_image(&json!({"data": [{"b64_json": "***"}]})).is_err());
    }

    #[tokio::test]
    async fn test_save_png_creates_directory() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("nested").join("uploads");
        let path = save_png(&uploads, b"png").await.unwrap();

        assert_eq!(path.parent().unwrap(), uploads.as_path());
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(&path).unwrap(), b"png".to_vec());
    }

    #[tokio::test]
    async fn test_missing_key_is_failure() {
        let tool = ImageGenerationTool::new(&AgentConfig::default());
        let res = tool.execute(json!({"prompt": "a lighthouse"})).await.unwrap();
        assert!(!res.success);
        assert!(res.summary.contains("OPENAI_API_KEY is not set"));
    }

    #[test]
    fn test_requires_approval() {
        let tool = ImageGenerationTool::new(&AgentConfig::default());
        assert!(tool.requires_approval(&json!({"prompt": "NSFW poster"})));
        assert!(!tool.requires_approval(&json!({"prompt": "a calm lake"})));
        assert!(!tool.cacheable());
    }
}
