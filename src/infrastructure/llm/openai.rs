use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// OpenAI chat completions. Reads `OPENAI_API_KEY` from the environment.
pub struct OpenAiLlm {
    model: String,
    temperature: f64,
}

impl OpenAiLlm {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(&config.model).with_temperature(config.temperature)
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

impl Default for OpenAiLlm {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_MODEL)
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let client = openai::Client::from_env();
        let agent = client
            .agent(&self.model)
            .temperature(self.temperature)
            .build();
        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(format!("completion request failed: {e}")))
    }
}
