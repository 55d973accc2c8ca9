//! Tool trait definition

use crate::Result;
use async_trait::async_trait;
use digest_llm::ToolDefinition;
use serde_json::Value;

/// Something the model can call
///
/// A tool advertises a name, a description and a JSON Schema for its input;
/// the executor hands it the arguments the model produced and sends the JSON
/// output back to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Run the tool. `params` should match [`Tool::input_schema`], but the
    /// model is free to get it wrong, so implementations must validate.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique within a registry
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> Value;

    /// The definition sent to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}
