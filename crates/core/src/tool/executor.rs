use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use specgen_model::ToolSchema;

use crate::tool::object::{ToolObject, ToolObjectImpl};
use crate::tool::{Tool, ToolResult};

/// A registry of tools that handles tool call requests by name.
///
/// Calls for names nobody registered are not errors: they produce an
/// `Unknown tool: <name>` result, and the model decides what to do next.
#[derive(Clone, Default)]
pub struct Executor {
    tools: HashMap<String, Arc<dyn ToolObject>>,
}

impl Executor {
    /// Creates an executor without any tools.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool, replacing any tool with the same name.
    pub fn register<T: Tool>(&mut self, tool: T) {
        let name = tool.name().to_owned();
        if self
            .tools
            .insert(name.clone(), Arc::new(ToolObjectImpl(tool)))
            .is_some()
        {
            debug!("replaced tool: {name}");
        }
    }

    /// Registers a tool, builder style.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.register(tool);
        self
    }

    /// Returns whether a tool with the name is registered.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the default schemas of the registered tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolSchema> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
            .into_iter()
            .map(|tool| {
                ToolSchema::function(
                    tool.name(),
                    tool.description(),
                    tool.parameter_schema().clone(),
                )
            })
            .collect()
    }

    /// Executes the named tool with the given arguments.
    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult {
        let Some(tool) = self.tools.get(name) else {
            warn!("tool not found: {name}");
            return Ok(format!("Unknown tool: {name}"));
        };
        trace!("executing tool {name} with args: {arguments:?}");
        tool.execute(arguments).await
    }
}
