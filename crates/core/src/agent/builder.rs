use specgen_model::{ModelProvider, ToolSchema};

use super::{Agent, DEFAULT_MAX_TURNS};
use crate::model_client::ModelClient;
use crate::tool::{Executor, Tool};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    tool_executor: Executor,
    tool_schemas: Option<Vec<ToolSchema>>,
    system_prompt: String,
    temperature: Option<f32>,
    max_turns: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            tool_executor: Executor::new(),
            tool_schemas: None,
            system_prompt: String::new(),
            temperature: None,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Sets the system prompt that opens every run.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the sampling temperature sent with every request.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the default turn budget of [`Agent::run`].
    #[inline]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tool_executor.register(tool);
        self
    }

    /// Replaces the tool executor.
    #[inline]
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.tool_executor = executor;
        self
    }

    /// Sets the tool schemas advertised to the model.
    ///
    /// Without this, the default schemas of the registered tools are
    /// advertised. Pass an empty list to advertise no tools at all.
    #[inline]
    pub fn with_tool_schemas(mut self, schemas: Vec<ToolSchema>) -> Self {
        self.tool_schemas = Some(schemas);
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Agent {
        let tool_schemas = self
            .tool_schemas
            .unwrap_or_else(|| self.tool_executor.definitions());
        Agent {
            model_client: self.model_client,
            tool_executor: self.tool_executor,
            tool_schemas,
            system_prompt: self.system_prompt,
            temperature: self.temperature,
            max_turns: self.max_turns,
        }
    }
}
