use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use prism::providers::{
    configs::{OllamaProviderConfig, OpenAiProviderConfig, ProviderConfig},
    factory::ProviderType,
    ollama,
};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Default, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Failed to parse socket address")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ProviderSettings {
    Ollama {
        #[serde(default = "default_ollama_host")]
        host: String,
        #[serde(default = "default_text_model")]
        text_model: String,
        #[serde(default = "default_vision_model")]
        vision_model: String,
    },
    OpenAi {
        #[serde(default = "default_openai_host")]
        host: String,
        api_key: String,
        #[serde(default = "default_openai_model")]
        model: String,
        #[serde(default)]
        temperature: Option<f32>,
        #[serde(default)]
        max_tokens: Option<i32>,
    },
}

impl ProviderSettings {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            ProviderSettings::Ollama { .. } => ProviderType::Ollama,
            ProviderSettings::OpenAi { .. } => ProviderType::OpenAi,
        }
    }

    // Convert to the prism ProviderConfig
    pub fn into_config(self) -> ProviderConfig {
        match self {
            ProviderSettings::Ollama {
                host,
                text_model,
                vision_model,
            } => ProviderConfig::Ollama(OllamaProviderConfig {
                host,
                text_model,
                vision_model,
            }),
            ProviderSettings::OpenAi {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            } => ProviderConfig::OpenAi(OpenAiProviderConfig {
                host,
                api_key,
                model,
                temperature,
                max_tokens,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ArtifactSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_artifact_dir")]
    pub dir: String,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_artifact_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub artifacts: ArtifactSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults: a local Ollama needs no environment at all
            .set_default("provider.type", "ollama")?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("PRISM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        // Try to deserialize the configuration
        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        // Handle missing field errors specially
        match result {
            Ok(settings) => Ok(settings),
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Handle both NotFound and missing field message variants
                let error_str = err.to_string();
                if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `api_key`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    let env_var = to_env_var(&format!("provider.{field}"));
                    Err(ConfigError::MissingEnvVar { env_var })
                } else if let config::ConfigError::NotFound(field) = &err {
                    let env_var = to_env_var(field);
                    Err(ConfigError::MissingEnvVar { env_var })
                } else {
                    Err(ConfigError::Other(err))
                }
            }
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ollama_host() -> String {
    ollama::OLLAMA_HOST.to_string()
}

fn default_text_model() -> String {
    ollama::OLLAMA_TEXT_MODEL.to_string()
}

fn default_vision_model() -> String {
    ollama::OLLAMA_VISION_MODEL.to_string()
}

fn default_openai_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_artifact_dir() -> String {
    "uploads".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("PRISM_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert!(!settings.artifacts.enabled);
        assert_eq!(settings.artifacts.dir, "uploads");
        assert!(matches!(
            settings.provider.provider_type(),
            ProviderType::Ollama
        ));

        if let ProviderSettings::Ollama {
            host,
            text_model,
            vision_model,
        } = settings.provider
        {
            assert_eq!(host, "http://localhost:11434");
            assert_eq!(text_model, "llama3.2");
            assert_eq!(vision_model, "llava");
        } else {
            panic!("Expected Ollama provider");
        }
    }

    #[test]
    #[serial]
    fn test_openai_settings() {
        clean_env();
        env::set_var("PRISM_PROVIDER__TYPE", "openai");
        env::set_var("PRISM_PROVIDER__API_KEY", "test-key");
        env::set_var("PRISM_PROVIDER__MODEL", "gpt-4o-mini");
        env::set_var("PRISM_PROVIDER__TEMPERATURE", "0.7");

        let settings = Settings::new().unwrap();
        if let ProviderSettings::OpenAi {
            host,
            api_key,
            model,
            temperature,
            max_tokens,
        } = settings.provider
        {
            assert_eq!(host, "https://api.openai.com");
            assert_eq!(api_key, "test-key");
            assert_eq!(model, "gpt-4o-mini");
            assert_eq!(temperature, Some(0.7));
            assert_eq!(max_tokens, None);
        } else {
            panic!("Expected OpenAI provider");
        }

        // Clean up
        env::remove_var("PRISM_PROVIDER__TYPE");
        env::remove_var("PRISM_PROVIDER__API_KEY");
        env::remove_var("PRISM_PROVIDER__MODEL");
        env::remove_var("PRISM_PROVIDER__TEMPERATURE");
    }

    #[test]
    #[serial]
    fn test_openai_without_key_names_the_env_var() {
        clean_env();
        env::set_var("PRISM_PROVIDER__TYPE", "openai");

        let err = Settings::new().unwrap_err();
        match err {
            ConfigError::MissingEnvVar { env_var } => {
                assert_eq!(env_var, "PRISM_PROVIDER__API_KEY");
            }
            other => panic!("expected MissingEnvVar, got {other:?}"),
        }

        env::remove_var("PRISM_PROVIDER__TYPE");
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        env::set_var("PRISM_SERVER__PORT", "8080");
        env::set_var("PRISM_PROVIDER__HOST", "http://custom.ollama.host");
        env::set_var("PRISM_ARTIFACTS__ENABLED", "true");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.server.port, 8080);
        assert!(settings.artifacts.enabled);

        if let ProviderSettings::Ollama { host, .. } = settings.provider {
            assert_eq!(host, "http://custom.ollama.host");
        } else {
            panic!("Expected Ollama provider");
        }

        // Clean up
        env::remove_var("PRISM_SERVER__PORT");
        env::remove_var("PRISM_PROVIDER__HOST");
        env::remove_var("PRISM_ARTIFACTS__ENABLED");
    }

    #[test]
    fn test_socket_addr_conversion() {
        let server_settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        };
        let addr = server_settings.socket_addr();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }
}
