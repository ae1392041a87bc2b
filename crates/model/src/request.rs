use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::ToolCallRequest;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    /// The input messages, oldest first.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model. Providers should omit the
    /// tools from the wire payload when this is empty.
    pub tools: Vec<ToolSchema>,
    /// Sampling temperature, if the caller wants to override the
    /// provider default.
    pub temperature: Option<f32>,
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// A reply from the assistant.
    Assistant(AssistantMessage),
    /// A tool call result.
    Tool(ToolCallResult),
}

/// A reply from the assistant, as it will be replayed to the model.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AssistantMessage {
    /// The text content, `None` if the reply carried no text.
    pub content: Option<String>,
    /// Tool calls requested in this reply.
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolCallResult {
    /// The identifier of the tool call request this result answers.
    pub id: String,
    /// The result of the tool call.
    pub content: String,
}

/// Describes a tool that can be used by the model.
///
/// The schema is opaque to the agent: it is usually read from a
/// configuration file and handed to the provider verbatim. For the
/// OpenAI-compatible providers this is an object of the form
/// `{"type": "function", "function": {"name", "description", "parameters"}}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolSchema(Value);

impl ToolSchema {
    /// Wraps a raw schema value.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Creates a function tool schema from its parts.
    pub fn function<S1, S2>(
        name: S1,
        description: S2,
        parameters: Value,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self(serde_json::json!({
            "type": "function",
            "function": {
                "name": name.into(),
                "description": description.into(),
                "parameters": parameters,
            }
        }))
    }

    /// Returns the tool name declared by the schema, looking at both the
    /// nested `function.name` and a top-level `name`.
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("function")
            .and_then(|f| f.get("name"))
            .or_else(|| self.0.get("name"))
            .and_then(Value::as_str)
    }

    /// Returns the raw schema value.
    #[inline]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_schema_name() {
        let schema =
            ToolSchema::function("think", "Records a thought.", json!({}));
        assert_eq!(schema.name(), Some("think"));

        let flat = ToolSchema::new(json!({ "name": "flat", "parameters": {} }));
        assert_eq!(flat.name(), Some("flat"));

        let unnamed = ToolSchema::new(json!({ "type": "function" }));
        assert_eq!(unnamed.name(), None);
    }
}
