use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use specgen_core::tool::{Tool, ToolResult};

#[derive(Deserialize, JsonSchema)]
pub struct ThinkParameters {
    #[schemars(description = "The reasoning to record.")]
    thought: String,
}

/// A tool that lets the model write down its reasoning without acting.
pub struct ThinkTool {
    parameter_schema: Value,
}

impl ThinkTool {
    /// Creates a new think tool.
    #[inline]
    pub fn new() -> Self {
        ThinkTool {
            parameter_schema: schema_for!(ThinkParameters).to_value(),
        }
    }
}

impl Default for ThinkTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ThinkTool {
    type Input = ThinkParameters;

    fn name(&self) -> &str {
        "think"
    }

    fn description(&self) -> &str {
        r#"
Records a thought. Use it to reason about the task before taking action,
it has no side effects."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: ThinkParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(format!("Thinking recorded: {}", input.thought)))
    }
}
