use specgen_core::{Agent, AgentBuilder, Error, RunOutcome};
use specgen_model::{ModelProvider, ToolSchema};
use specgen_openai_model::OpenAIProvider;

use crate::config::AgentConfig;
use crate::tools::builtin_executor;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    tool_schemas: Option<Vec<ToolSchema>>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            tool_schemas: None,
        }
    }

    /// Creates a session builder talking to the provider selected by the
    /// agent configuration.
    pub fn from_config(config: &AgentConfig) -> Self {
        debug!(
            "agent `{}` uses {} model `{}`",
            config.name, config.provider, config.model
        );
        let provider = OpenAIProvider::new(config.provider_config());
        Self::with_model_provider(provider).with_agent_config(config)
    }

    /// Applies the system prompt, temperature and tool schemas of an agent
    /// configuration.
    pub fn with_agent_config(mut self, config: &AgentConfig) -> Self {
        self.tool_schemas = Some(config.tool_schemas.clone());
        self.with_system_prompt(config.system_prompt.clone())
            .with_temperature(config.temperature)
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Sets the sampling temperature.
    #[inline]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.agent_builder = self.agent_builder.with_temperature(temperature);
        self
    }

    /// Sets the turn budget of [`Session::run`].
    #[inline]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_turns(max_turns);
        self
    }

    /// Builds a new session.
    ///
    /// Every built-in tool is registered. Only the configured schemas are
    /// advertised when an agent configuration was applied.
    pub fn build(self) -> Session {
        let mut agent_builder =
            self.agent_builder.with_executor(builtin_executor());
        if let Some(tool_schemas) = self.tool_schemas {
            agent_builder = agent_builder.with_tool_schemas(tool_schemas);
        }

        Session {
            agent: agent_builder.build(),
        }
    }
}

/// A fully configured agent that answers one prompt per run.
///
/// Runs don't share any state, so one session can serve several prompts.
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Runs the agent on `input` and returns its final answer.
    #[inline]
    pub async fn run(&self, input: &str) -> Result<String, Error> {
        self.agent.run(input).await
    }

    /// Runs the agent on `input` and returns the full outcome.
    #[inline]
    pub async fn run_to_outcome(
        &self,
        input: &str,
    ) -> Result<RunOutcome, Error> {
        self.agent.run_to_outcome(input, self.agent.max_turns()).await
    }

    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[cfg(test)]
mod tests {
    use specgen_core::StopReason;
    use specgen_model::ModelMessage;
    use specgen_test_model::{PresetResponse, TestModelProvider};

    use super::*;
    use crate::config::{ConfigFile, Credentials, Provider};

    fn agent_config() -> AgentConfig {
        let file = ConfigFile::parse(
            r#"
agent:
  reviewer_agent:
    model: deepseek-chat
    tools: [think]
    system_prompt: Review carefully.
    temperature: 0.5
"#,
        )
        .unwrap();
        let credentials =
            Credentials::default().with_key(Provider::DeepSeek, "k");
        file.agent_config("reviewer_agent", None, &credentials).unwrap()
    }

    #[tokio::test]
    async fn test_configured_session() {
        let provider = TestModelProvider::with_script([
            PresetResponse::tool_call(
                "call_1",
                "think",
                r#"{"thought":"look at the edge cases"}"#,
            ),
            PresetResponse::text("All good."),
        ]);
        let session = SessionBuilder::with_model_provider(provider.clone())
            .with_agent_config(&agent_config())
            .build();

        let outcome = session.run_to_outcome("Review this.").await.unwrap();
        assert_eq!(outcome.answer, "All good.");
        assert_eq!(outcome.stop, StopReason::Finished);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].temperature, Some(0.5));
        assert_eq!(
            requests[0]
                .tools
                .iter()
                .map(|schema| schema.name())
                .collect::<Vec<_>>(),
            vec![Some("think")]
        );
        assert_eq!(
            requests[0].messages[0],
            ModelMessage::System("Review carefully.".to_owned())
        );
        assert!(requests[1].messages.iter().any(|message| matches!(
            message,
            ModelMessage::Tool(result)
                if result.content == "Thinking recorded: look at the edge cases"
        )));
    }

    #[tokio::test]
    async fn test_unconfigured_session_advertises_builtins() {
        let provider =
            TestModelProvider::with_script([PresetResponse::text("Hi")]);
        let session = SessionBuilder::with_model_provider(provider.clone())
            .with_max_turns(3)
            .build();
        assert_eq!(session.agent().max_turns(), 3);
        assert_eq!(session.run("Hello").await.unwrap(), "Hi");

        let requests = provider.requests();
        let mut names: Vec<_> =
            requests[0].tools.iter().filter_map(|s| s.name()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["bash_command", "think"]);
    }
}
