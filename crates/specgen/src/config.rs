//! Agent configuration: the YAML document naming agents and tools, the
//! credentials taken from the environment, and the provider they select.

use std::collections::HashMap;
use std::env;
use std::fmt::{self, Debug, Display};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use specgen_model::ToolSchema;
use specgen_openai_model::{OpenAIConfig, OpenAIConfigBuilder};
use thiserror::Error;

use crate::tools::BuiltinTool;

/// Where the configuration document is looked up by default.
pub const DEFAULT_CONFIG_PATH: &str = "agent/agent.yaml";

/// The agent used when the requested one is not configured.
pub const DEFAULT_AGENT: &str = "specification_agent";

/// Sampling temperature for agents that don't set one.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Errors raised while loading the configuration. They are fatal.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    /// The document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The document is not valid YAML, or has the wrong shape.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The document is empty or `null`.
    #[error("the configuration document is empty")]
    Empty,
    /// Neither the requested agent nor [`DEFAULT_AGENT`] is configured.
    #[error(
        "agent `{requested}` is not configured, \
         and neither is the default agent `specification_agent`"
    )]
    UnknownAgent { requested: String },
    #[error("agent `{0}` has no model configured and no override was given")]
    MissingModel(String),
    /// An agent lists a tool that is neither defined in the document nor
    /// built in.
    #[error("agent `{agent}` lists tool `{tool}`, which has no schema")]
    UnknownTool { agent: String, tool: String },
    /// The API key of the selected provider is not set.
    #[error("{var} is not set, it is required for model `{model}`")]
    MissingCredential { var: &'static str, model: String },
}

/// The endpoint family a model is served from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    /// `api.deepseek.com`.
    DeepSeek,
    /// `openrouter.ai`, serving every other model.
    OpenRouter,
}

impl Provider {
    /// Picks the provider for a model identifier: DeepSeek for anything
    /// mentioning `deepseek`, OpenRouter for the rest.
    pub fn for_model(model: &str) -> Self {
        if model.contains("deepseek") {
            Provider::DeepSeek
        } else {
            Provider::OpenRouter
        }
    }

    /// Returns the base URL of the provider's chat completion API.
    pub fn base_url(self) -> &'static str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Returns the environment variable holding the provider's key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::DeepSeek => f.write_str("DeepSeek"),
            Provider::OpenRouter => f.write_str("OpenRouter"),
        }
    }
}

/// API keys, collected once at startup.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    deepseek_api_key: Option<String>,
    openrouter_api_key: Option<String>,
}

impl Credentials {
    /// Reads the keys from the process environment. Empty values count as
    /// unset.
    pub fn from_env() -> Self {
        let read = |provider: Provider| {
            env::var(provider.api_key_var())
                .ok()
                .filter(|key| !key.trim().is_empty())
        };
        Self {
            deepseek_api_key: read(Provider::DeepSeek),
            openrouter_api_key: read(Provider::OpenRouter),
        }
    }

    /// Sets the key for a provider.
    pub fn with_key<S: Into<String>>(
        mut self,
        provider: Provider,
        key: S,
    ) -> Self {
        let key = Some(key.into());
        match provider {
            Provider::DeepSeek => self.deepseek_api_key = key,
            Provider::OpenRouter => self.openrouter_api_key = key,
        }
        self
    }

    /// Returns the key for a provider, if any.
    pub fn api_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::DeepSeek => self.deepseek_api_key.as_deref(),
            Provider::OpenRouter => self.openrouter_api_key.as_deref(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("deepseek_api_key", &redact(&self.deepseek_api_key))
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
struct AgentSettings {
    model: Option<String>,
    #[serde(default)]
    tools: Vec<String>,
    system_prompt: Option<String>,
    temperature: Option<f32>,
}

impl AgentSettings {
    fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.tools.is_empty()
            && self.system_prompt.is_none()
            && self.temperature.is_none()
    }
}

/// The parsed configuration document.
///
/// ```yaml
/// agent:
///   reviewer_agent:
///     model: deepseek-chat
///     tools: [bash_command, think]
///     system_prompt: You review code.
///     temperature: 0.1
/// tools:
///   bash_command: { type: function, function: { name: bash_command, ... } }
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    agent: HashMap<String, Option<AgentSettings>>,
    #[serde(default)]
    tools: HashMap<String, Value>,
}

impl ConfigFile {
    /// Reads and parses the document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses a YAML document.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Err(ConfigError::Empty);
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        if value.is_null() {
            return Err(ConfigError::Empty);
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Returns the names of the configured agents, sorted.
    pub fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.agent.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves the configuration of one agent.
    ///
    /// A missing agent falls back to [`DEFAULT_AGENT`], and so does one
    /// whose entry is null or has no settings. The model is the
    /// override if given, the configured one otherwise, and it selects the
    /// provider and therefore the credential.
    pub fn agent_config(
        &self,
        agent_name: &str,
        model_override: Option<&str>,
        credentials: &Credentials,
    ) -> Result<AgentConfig, ConfigError> {
        let (name, settings) = match self.settings(agent_name) {
            Some(found) => found,
            None => {
                let fallback = self.settings(DEFAULT_AGENT).ok_or_else(|| {
                    ConfigError::UnknownAgent {
                        requested: agent_name.to_owned(),
                    }
                })?;
                warn!(
                    "agent `{agent_name}` is not configured, \
                     using `{DEFAULT_AGENT}`"
                );
                fallback
            }
        };

        let model = model_override
            .map(ToOwned::to_owned)
            .or_else(|| settings.model.clone())
            .ok_or_else(|| ConfigError::MissingModel(name.clone()))?;

        let tool_schemas = settings
            .tools
            .iter()
            .map(|tool| self.tool_schema(name, tool))
            .collect::<Result<Vec<_>, _>>()?;

        let provider = Provider::for_model(&model);
        let api_key = credentials
            .api_key(provider)
            .ok_or_else(|| ConfigError::MissingCredential {
                var: provider.api_key_var(),
                model: model.clone(),
            })?
            .to_owned();

        Ok(AgentConfig {
            name: name.clone(),
            model,
            provider,
            api_key,
            tools: settings.tools.clone(),
            tool_schemas,
            system_prompt: settings.system_prompt.clone().unwrap_or_default(),
            temperature: settings.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        })
    }

    fn settings(&self, name: &str) -> Option<(&String, &AgentSettings)> {
        match self.agent.get_key_value(name)? {
            (name, Some(settings)) if !settings.is_empty() => {
                Some((name, settings))
            }
            _ => None,
        }
    }

    fn tool_schema(
        &self,
        agent: &str,
        tool: &str,
    ) -> Result<ToolSchema, ConfigError> {
        if let Some(schema) = self.tools.get(tool) {
            return Ok(ToolSchema::new(schema.clone()));
        }
        if let Some(builtin) = BuiltinTool::from_name(tool) {
            debug!("no schema configured for `{tool}`, using the built-in one");
            return Ok(builtin.default_schema());
        }
        Err(ConfigError::UnknownTool {
            agent: agent.to_owned(),
            tool: tool.to_owned(),
        })
    }
}

/// Loads the document at `path` and resolves one agent from it.
pub fn load<P: AsRef<Path>>(
    agent_name: &str,
    model_override: Option<&str>,
    path: P,
    credentials: &Credentials,
) -> Result<AgentConfig, ConfigError> {
    ConfigFile::load(path)?.agent_config(
        agent_name,
        model_override,
        credentials,
    )
}

/// Everything needed to build an agent for one run.
#[derive(Clone, PartialEq)]
pub struct AgentConfig {
    /// The agent name actually used, after falling back.
    pub name: String,
    /// The model identifier sent with every request.
    pub model: String,
    /// The provider selected by `model`.
    pub provider: Provider,
    api_key: String,
    /// Tool names in configuration order.
    pub tools: Vec<String>,
    /// Schemas for `tools`, in the same order.
    pub tool_schemas: Vec<ToolSchema>,
    /// The system prompt, empty if none is configured.
    pub system_prompt: String,
    /// The sampling temperature.
    pub temperature: f32,
}

impl AgentConfig {
    /// Returns the provider configuration for this agent's model.
    pub fn provider_config(&self) -> OpenAIConfig {
        OpenAIConfigBuilder::with_api_key(&self.api_key)
            .with_base_url(self.provider.base_url())
            .with_model(&self.model)
            .build()
    }
}

impl Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("tools", &self.tools)
            .field("system_prompt", &self.system_prompt)
            .field("temperature", &self.temperature)
            .finish()
    }
}
