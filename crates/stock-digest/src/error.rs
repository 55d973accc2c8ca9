//! Error types for the digest pipeline

use digest_agent::AgentError;
use thiserror::Error;

/// Why a ticker could not be analyzed
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Model, provider or loop failure inside the agent
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Why a digest email could not be delivered
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("Failed to build email: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
