//! Tool-calling agent runtime
//!
//! An agent here is a language model plus a set of [`Tool`]s. The
//! [`AgentExecutor`] runs the usual loop: ask the model, run whatever tools it
//! requests, feed the results back, and stop once it answers in plain text.

pub mod error;
pub mod executor;
pub mod registry;
pub mod tool;

pub use error::{AgentError, Result};
pub use executor::{AgentExecutor, AgentExecutorBuilder, ExecutorConfig};
pub use registry::ToolRegistry;
pub use tool::Tool;
