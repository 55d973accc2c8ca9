//! Tool definitions advertised to the model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A callable tool as the model sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Must match the name the tool is registered under
    pub name: String,

    /// Tells the model when the tool is useful
    pub description: String,

    /// JSON Schema for the tool's arguments
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Small JSON Schema builders for tool inputs
///
/// ```
/// use digest_llm::tools::schema;
/// use serde_json::json;
///
/// let input = schema::object(
///     json!({
///         "query": schema::string("Search query"),
///         "max_results": schema::integer("Maximum number of results"),
///     }),
///     &["query"],
/// );
/// assert_eq!(input["required"][0], "query");
/// ```
pub mod schema {
    use serde_json::{Value, json};

    pub fn object(properties: Value, required: &[&str]) -> Value {
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn string(description: &str) -> Value {
        json!({
            "type": "string",
            "description": description,
        })
    }

    pub fn integer(description: &str) -> Value {
        json!({
            "type": "integer",
            "description": description,
        })
    }
}
