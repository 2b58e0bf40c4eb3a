use anyhow::Result;
use strum_macros::EnumIter;

use super::{
    base::Provider, configs::ProviderConfig, ollama::OllamaProvider, openai::OpenAiProvider,
};

#[derive(EnumIter, Debug)]
pub enum ProviderType {
    Ollama,
    OpenAi,
}

pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>> {
    match config {
        ProviderConfig::Ollama(ollama_config) => Ok(Box::new(OllamaProvider::new(ollama_config)?)),
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::configs::{OllamaProviderConfig, OpenAiProviderConfig};
    use crate::providers::ollama;
    use strum::IntoEnumIterator;

    fn config_for(provider_type: &ProviderType) -> ProviderConfig {
        match provider_type {
            ProviderType::Ollama => ProviderConfig::Ollama(OllamaProviderConfig {
                host: ollama::OLLAMA_HOST.to_string(),
                text_model: ollama::OLLAMA_TEXT_MODEL.to_string(),
                vision_model: ollama::OLLAMA_VISION_MODEL.to_string(),
            }),
            ProviderType::OpenAi => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host: "https://api.openai.com".to_string(),
                api_key: "test-key".to_string(),
                model: "gpt-4o".to_string(),
                temperature: None,
                max_tokens: None,
            }),
        }
    }

    #[test]
    fn test_every_registered_provider_type_constructs() {
        for provider_type in ProviderType::iter() {
            let provider = get_provider(config_for(&provider_type));
            assert!(provider.is_ok(), "{provider_type:?} failed to construct");
        }
    }
}
