use super::types::ChatMessage;
use crate::{Error, Result, config::LlmConfig};
use async_openai::{Client, config::OpenAIConfig, types as openai_types};
use async_trait::async_trait;
use tracing::debug;

/// A text-generation backend: prompt in, raw model text out.
///
/// Implementations must be callable concurrently; the reflection runner
/// issues several `generate` calls on one instance at the same time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}

pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: Option<String>,
    max_tokens: Option<u32>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key);

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url);
        }

        let client = Client::with_config(openai_config);

        Self {
            client,
            model: config.model,
            system_prompt: config.system_prompt,
            max_tokens: config.max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_messages(&self, prompt: &str) -> Result<Vec<openai_types::ChatCompletionRequestMessage>> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::system(system).to_openai_message()?);
        }
        messages.push(ChatMessage::user(prompt).to_openai_message()?);
        Ok(messages)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        debug!(
            "Creating chat completion with model {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let messages = self.build_messages(prompt)?;

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.model)
            .messages(messages)
            .temperature(temperature);

        if let Some(max_tokens) = self.max_tokens {
            request_builder.max_tokens(max_tokens);
        }

        let openai_request = request_builder.build()?;

        let response = self.client.chat().create(openai_request).await?;

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm("Chat completion returned no choices"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
