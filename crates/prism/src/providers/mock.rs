use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use crate::providers::base::Provider;

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Mutex<Vec<String>>,
    text_calls: Mutex<Vec<String>>,
    image_calls: Mutex<Vec<String>>,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            text_calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(Vec::new()),
            failure: None,
            delay: None,
        }
    }

    /// Create a mock provider whose every call fails with the given detail
    pub fn failing(detail: &str) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            text_calls: Mutex::new(Vec::new()),
            image_calls: Mutex::new(Vec::new()),
            failure: Some(detail.to_string()),
            delay: None,
        }
    }

    /// Delay every call, for exercising timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn text_calls(&self) -> Vec<String> {
        self.text_calls.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<String> {
        self.image_calls.lock().unwrap().clone()
    }

    async fn answer(&self) -> Result<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(detail) = &self.failure {
            return Err(anyhow!("{}", detail));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Ok(String::new())
        } else {
            Ok(responses.remove(0))
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.text_calls.lock().unwrap().push(prompt.to_string());
        self.answer().await
    }

    async fn generate_from_image(&self, prompt: &str, _image_base64: &str) -> Result<String> {
        self.image_calls.lock().unwrap().push(prompt.to_string());
        self.answer().await
    }
}
