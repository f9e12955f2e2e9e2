//! Chat-completion endpoint configuration

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;

use super::error::{LlmError, LlmResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-Coder-480B-A35B-Instruct";
pub const DEFAULT_API_KEY_ENV: &str = "FORMSMITH_LLM_API_KEY";

/// LLM endpoint configuration injected into the generation service
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Full chat-completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name/identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Inline API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature for every request
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Token ceiling for every request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: inline value first, then the configured env var
    pub fn resolve_api_key(&self) -> LlmResult<SecretString> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(SecretString::from(key.to_string()));
        }
        env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| {
                LlmError::Authentication(format!(
                    "API key not configured inline or in environment variable {}",
                    self.api_key_env
                ))
            })
    }
}

/// Mask a secret for log output, keeping only a short prefix
pub fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{}***", prefix)
}
