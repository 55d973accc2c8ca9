//! Error types for market data and search lookups

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    /// A capability needs configuration that is missing
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Rate limit exceeded for {provider}")]
    RateLimited { provider: String },

    /// The provider answered, but with an error or an unusable body
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;

impl From<MarketError> for digest_agent::AgentError {
    fn from(err: MarketError) -> Self {
        digest_agent::AgentError::Tool(err.to_string())
    }
}
