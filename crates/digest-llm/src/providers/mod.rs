//! Concrete [`LlmProvider`](crate::LlmProvider) implementations

pub mod groq;

pub use groq::{DEFAULT_GROQ_API_BASE, DEFAULT_GROQ_MODEL, GroqConfig, GroqProvider};
