use crate::config::{LlmConfig, LlmProvider};
use crate::error::{assistant_error, BotResult};
use async_trait::async_trait;
use rig::completion::{Chat, Message};
use rig::providers::{gemini, openai};
use tracing::{debug, info};

/// A stateless completion function: prompts in, text out
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> BotResult<String>;
}

enum Backend {
    OpenAi(openai::Client),
    Gemini(gemini::Client),
}

/// Language model reached through Rig
pub struct RigModel {
    backend: Backend,
    model: String,
    temperature: f64,
}

impl RigModel {
    pub fn from_config(config: &LlmConfig) -> Self {
        let backend = match config.provider {
            LlmProvider::OpenAi => {
                Backend::OpenAi(openai::Client::from_url(&config.api_key, &config.base_url))
            }
            LlmProvider::Gemini => Backend::Gemini(gemini::Client::new(&config.api_key)),
        };
        info!("Using {:?} model: {}", config.provider, config.model);

        Self {
            backend,
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for RigModel {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> BotResult<String> {
        let history = Vec::<Message>::new();

        let response = match &self.backend {
            Backend::OpenAi(client) => {
                let agent = client
                    .agent(&self.model)
                    .preamble(system_prompt)
                    .temperature(self.temperature)
                    .build();
                agent.chat(user_prompt.to_string(), history).await
            }
            Backend::Gemini(client) => {
                let agent = client
                    .agent(&self.model)
                    .preamble(system_prompt)
                    .temperature(self.temperature)
                    .build();
                agent.chat(user_prompt.to_string(), history).await
            }
        }
        .map_err(|e| assistant_error(&format!("Model request failed: {}", e)))?;

        debug!("Received {} characters from the model", response.len());
        Ok(response)
    }
}
