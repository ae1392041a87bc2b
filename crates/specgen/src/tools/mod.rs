//! The tools shipped with specgen.
//!
//! [`BuiltinTool`] is the closed set of tools the configuration can refer
//! to by name. They are registered into a [`specgen_core::tool::Executor`],
//! which stays open for further tools.

mod bash;
mod think;

use std::fmt::{self, Display};

use serde_json::Value;
use specgen_core::tool::{Executor, Tool, render_result};
use specgen_model::ToolSchema;

pub use bash::{BASH_COMMAND_TIMEOUT, BashCommandTool, run_command};
pub use think::ThinkTool;

/// A tool that ships with specgen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinTool {
    /// Runs a shell command, see [`BashCommandTool`].
    BashCommand,
    /// Records a thought, see [`ThinkTool`].
    Think,
}

impl BuiltinTool {
    /// Every built-in tool.
    pub const ALL: [BuiltinTool; 2] =
        [BuiltinTool::BashCommand, BuiltinTool::Think];

    /// Returns the name the model uses to call the tool.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinTool::BashCommand => "bash_command",
            BuiltinTool::Think => "think",
        }
    }

    /// Looks up a built-in tool by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Returns the schema advertised for the tool when the configuration
    /// does not define one.
    pub fn default_schema(self) -> ToolSchema {
        match self {
            BuiltinTool::BashCommand => schema_of(&BashCommandTool::new()),
            BuiltinTool::Think => schema_of(&ThinkTool::new()),
        }
    }

    /// Registers the tool with its default settings.
    pub fn register(self, executor: &mut Executor) {
        match self {
            BuiltinTool::BashCommand => {
                executor.register(BashCommandTool::new())
            }
            BuiltinTool::Think => executor.register(ThinkTool::new()),
        }
    }
}

impl Display for BuiltinTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Creates an executor with every built-in tool registered.
pub fn builtin_executor() -> Executor {
    let mut executor = Executor::new();
    for tool in BuiltinTool::ALL {
        tool.register(&mut executor);
    }
    executor
}

/// Executes a built-in tool by name and renders the result as the text the
/// model would see.
pub async fn execute_tool(name: &str, arguments: Value) -> String {
    render_result(builtin_executor().execute(name, arguments).await)
}

fn schema_of<T: Tool>(tool: &T) -> ToolSchema {
    ToolSchema::function(
        tool.name(),
        tool.description().trim(),
        tool.parameter_schema().clone(),
    )
}
