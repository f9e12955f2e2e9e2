//! Error types for LLM provider calls

use thiserror::Error;

/// Errors raised while talking to a chat-completion endpoint
#[derive(Debug, Error)]
pub enum LlmError {
    /// Non-2xx response
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API key missing or rejected
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider configuration is unusable
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("Connection error: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
