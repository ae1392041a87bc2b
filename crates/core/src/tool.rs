//! Tool call supports.

mod error;
mod executor;
mod object;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub use executor::Executor;

/// The result of a tool call.
///
/// Failures a tool wants the model to see as normal output (a command that
/// exits non-zero, for instance) should be `Ok`. `Err` is for calls the
/// tool could not even attempt.
pub type ToolResult = Result<String, Error>;

/// The prefix the agent puts in front of a failed tool call's reason.
pub const TOOL_FAILURE_PREFIX: &str = "Error executing/parsing tool: ";

/// Renders a tool result into the text that is sent back to the model.
#[inline]
pub fn render_result(result: ToolResult) -> String {
    match result {
        Ok(output) => output,
        Err(err) => format!("{TOOL_FAILURE_PREFIX}{}", err.reason()),
    }
}

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless. Any context the tool
/// needs, such as a timeout, should be fixed at construction and copied
/// into the future returned by [`Tool::execute`].
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns the description of the tool.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the tool.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of `self`.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}
