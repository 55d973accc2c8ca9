//! Error types for chat-completion calls

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors raised while talking to a completion endpoint
#[derive(Error, Debug)]
pub enum LlmError {
    /// Non-success HTTP status not covered by a more specific variant
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The endpoint rejected the API key
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Transport-level failure (DNS, TLS, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The body did not have the shape we expect
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

impl LlmError {
    /// Map an unsuccessful HTTP status to the matching variant.
    pub fn from_status(status: u16, body: String, model: &str) -> Self {
        match status {
            401 => Self::AuthenticationFailed,
            429 => Self::RateLimitExceeded(body),
            400 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}
