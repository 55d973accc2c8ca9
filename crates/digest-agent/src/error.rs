//! Error types for agent execution

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {
    /// The completion call itself failed
    #[error(transparent)]
    Llm(#[from] digest_llm::LlmError),

    /// A tool rejected its input or its backend failed
    #[error("Tool failed: {0}")]
    Tool(String),

    /// The model kept requesting tools past the configured budget
    #[error("Agent stopped after {0} iterations without a final answer")]
    IterationLimit(usize),

    #[error("Agent initialization failed: {0}")]
    Initialization(String),
}
