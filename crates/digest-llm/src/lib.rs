//! Chat-completion provider layer for stock-digest
//!
//! This crate keeps the rest of the workspace independent of any one
//! language-model vendor. It includes:
//!
//! - Message types for multi-turn, tool-using conversations
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The `LlmProvider` trait
//! - A Groq provider speaking the OpenAI-compatible chat completions API

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LlmError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LlmProvider;
pub use tools::ToolDefinition;
