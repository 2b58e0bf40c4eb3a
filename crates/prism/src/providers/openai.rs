use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::Provider;
use super::configs::OpenAiProviderConfig;

/// OpenAI-compatible chat-completions alternative for the local capability
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

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

    fn build_payload(&self, content: Value) -> Value {
        let mut payload = json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": content}]
        });

        if let Some(temp) = self.config.temperature {
            payload
                .as_object_mut()
                .expect("payload is an object")
                .insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload
                .as_object_mut()
                .expect("payload is an object")
                .insert("max_tokens".to_string(), json!(tokens));
        }

        payload
    }

    fn extract_content(data: &Value) -> Result<String> {
        data.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| anyhow!("No message content in response"))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let payload = self.build_payload(json!(prompt));
        let response = self.post(payload).await?;
        Self::extract_content(&response)
    }

    async fn generate_from_image(&self, prompt: &str, image_base64: &str) -> Result<String> {
        let content = json!([
            {"type": "text", "text": prompt},
            {
                "type": "image_url",
                "image_url": {"url": format!("data:image/jpeg;base64,{}", image_base64)}
            }
        ]);

        let payload = self.build_payload(content);
        let response = self.post(payload).await?;
        Self::extract_content(&response)
    }
}
