//! Error types for the generation pipeline

use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by the generation service
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport or API-status failure from the LLM endpoint
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    /// Completion had no JSON, invalid JSON, or was missing required keys
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    /// A prompt template could not be registered or rendered
    #[error("Prompt template error: {0}")]
    Template(String),

    /// The request itself is unusable (e.g. no categories requested)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<tera::Error> for GenerationError {
    fn from(err: tera::Error) -> Self {
        // tera nests the useful detail in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        GenerationError::Template(message)
    }
}

/// Result type alias for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;
