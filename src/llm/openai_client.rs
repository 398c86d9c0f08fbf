//! OpenAI-compatible backend for [`LlmClient`], gated behind the
//! `llm-openai` feature so the default build never requires network access
//! or an API key.

use super::driver::{LlmClient, LlmResponse};
use super::prompt::GenerationParams;
use async_openai::Client;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;

/// Thin wrapper around `async-openai`'s chat completion endpoint.
pub struct OpenAiLlmClient {
    client: Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiLlmClient {
    /// Builds a client for `model`, reading credentials from the standard
    /// `OPENAI_API_KEY` environment variable via `async-openai`'s default
    /// configuration.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self { client: Client::new(), model: model.into() }
    }
}

#[async_trait]
impl LlmClient for OpenAiLlmClient {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<LlmResponse, String> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content("You answer questions about policy documents using only the supplied context.")
            .build()
            .map_err(|e| e.to_string())?
            .into();
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| e.to_string())?
            .into();

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![system, user])
            .temperature(params.temperature)
            .max_tokens(params.max_output_tokens)
            .build()
            .map_err(|e| e.to_string())?;

        let response = self.client.chat().create(request).await.map_err(|e| e.to_string())?;

        let choice = response.choices.into_iter().next().ok_or_else(|| "no completion choices returned".to_string())?;
        let safety_blocked = choice.finish_reason.is_some_and(|r| matches!(r, async_openai::types::FinishReason::ContentFilter));
        let text = choice.message.content.unwrap_or_default();

        Ok(LlmResponse { text, safety_blocked })
    }
}
