use anyhow::Result;
use async_trait::async_trait;

/// Base trait for generative backends that can be called in-process.
///
/// Remote backends are redirect-only and never go through this trait; only
/// the local default capability does.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Produce text from a plain prompt
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Produce text from a prompt about a base64-encoded image
    async fn generate_from_image(&self, prompt: &str, image_base64: &str) -> Result<String>;
}
