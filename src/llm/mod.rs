//! Prompt assembly and the rate-limited, retrying LLM driver.

mod driver;
mod prompt;

pub use driver::{LlmClient, LlmDriver, LlmResponse, LlmUsageStats, ScriptedLlmClient, estimate_tokens};
pub use prompt::{GenerationParams, PromptBuilder};

#[cfg(feature = "llm-openai")]
mod openai_client;

#[cfg(feature = "llm-openai")]
pub use openai_client::OpenAiLlmClient;
