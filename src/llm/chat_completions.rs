//! OpenAI-compatible chat-completions provider

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use super::config::{mask_secret, LlmConfig};
use super::error::{LlmError, LlmResult};
use super::message::Message;
use super::{CompletionRequest, CompletionResponse, LlmProvider, TokenUsage};

/// Provider for any endpoint accepting `{model, messages, temperature, max_tokens}`
pub struct ChatCompletionsProvider {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    default_temperature: f32,
    default_max_tokens: u32,
}

impl ChatCompletionsProvider {
    /// Create a provider from configuration, resolving the API key
    pub fn new(config: &LlmConfig) -> LlmResult<Self> {
        let api_key = config.resolve_api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit key
    pub fn with_api_key(config: &LlmConfig, api_key: SecretString) -> LlmResult<Self> {
        if config.endpoint.is_empty() {
            return Err(LlmError::Configuration("endpoint is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        tracing::debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            api_key = %mask_secret(api_key.expose_secret()),
            "Configured chat-completions provider"
        );

        Ok(Self {
            client,
            api_key,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            default_temperature: config.temperature,
            default_max_tokens: config.max_tokens,
        })
    }

    /// Build the request body
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": request.model.as_ref().unwrap_or(&self.model),
            "messages": Self::convert_messages(&request.messages),
            "temperature": request.temperature.unwrap_or(self.default_temperature),
            "max_tokens": request.max_tokens.unwrap_or(self.default_max_tokens),
        })
    }

    fn convert_messages(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect()
    }

    /// Extract the first choice's message content
    fn parse_response(response: ChatResponse) -> LlmResult<CompletionResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("No choices in response".to_string()))?;

        let message = choice
            .message
            .ok_or_else(|| LlmError::Parse("Choice has no message".to_string()))?;

        let content = message
            .content
            .ok_or_else(|| LlmError::Parse("Message has no content".to_string()))?;

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(CompletionResponse {
            content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(&request);
        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending completion request");
        tracing::trace!(body = %body, "Completion request body");

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion response received"
        );

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {}", e)))?;

        let completion = Self::parse_response(chat_response)?;
        tracing::trace!(content = %completion.content, "Completion content");
        Ok(completion)
    }
}

// Chat-completions response types

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ChatCompletionsProvider {
        let config = LlmConfig {
            endpoint: "http://localhost:9/v1/chat/completions".to_string(),
            model: "test-model".to_string(),
            ..Default::default()
        };
        ChatCompletionsProvider::with_api_key(&config, SecretString::from("sk-test".to_string()))
            .unwrap()
    }

    #[test]
    fn test_request_body_uses_defaults() {
        let body = provider().build_request_body(&CompletionRequest {
            messages: vec![Message::user("hello")],
            ..Default::default()
        });

        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["max_tokens"], 2000);
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_missing_choices_is_parse_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            ChatCompletionsProvider::parse_response(response),
            Err(LlmError::Parse(_))
        ));

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"finish_reason": "stop"}]}"#).unwrap();
        assert!(matches!(
            ChatCompletionsProvider::parse_response(response),
            Err(LlmError::Parse(_))
        ));
    }
}
