use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::Provider;
use super::configs::OllamaProviderConfig;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_TEXT_MODEL: &str = "llama3.2";
pub const OLLAMA_VISION_MODEL: &str = "llava";

/// The local default backend, talking to Ollama's native generate API
pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/api/generate", self.config.host.trim_end_matches('/'));

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            _ => Err(anyhow!(
                "Request failed: {}\nPayload: {}",
                response.status(),
                payload
            )),
        }
    }

    fn extract_response(data: &Value) -> Result<String> {
        data.get("response")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| anyhow!("No response field in Ollama reply"))
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let payload = json!({
            "model": self.config.text_model,
            "prompt": prompt,
            "stream": false
        });

        let response = self.post(payload).await?;
        Self::extract_response(&response)
    }

    async fn generate_from_image(&self, prompt: &str, image_base64: &str) -> Result<String> {
        let payload = json!({
            "model": self.config.vision_model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = self.post(payload).await?;
        Self::extract_response(&response)
    }
}
