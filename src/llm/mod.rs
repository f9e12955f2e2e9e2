//! LLM provider abstraction
//!
//! The generation pipeline only needs single-turn, non-streaming completions,
//! so the trait is small. `ChatCompletionsProvider` speaks the OpenAI-style
//! `/chat/completions` protocol that most hosted models expose.

mod chat_completions;
pub mod config;
pub mod error;
pub mod message;

pub use chat_completions::ChatCompletionsProvider;
pub use config::LlmConfig;
pub use error::{LlmError, LlmResult};
pub use message::{Message, Role};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;

    /// Complete a request
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;

    /// Send one user prompt and return the text of the first choice
    async fn complete_prompt(&self, prompt: &str) -> LlmResult<String> {
        let response = self
            .complete(CompletionRequest {
                messages: vec![Message::user(prompt)],
                ..Default::default()
            })
            .await?;
        Ok(response.content)
    }
}

/// Request for LLM completion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Model to use (overrides provider default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response from LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Text of the first choice
    pub content: String,
    /// Reason the completion stopped, as reported by the endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    /// Token usage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
