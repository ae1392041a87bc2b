mod builder;
mod state;

use serde_json::Value;
use specgen_model::{ModelRequest, ToolCallRequest, ToolSchema};

use crate::conversation::Transcript;
use crate::error::Error;
use crate::model_client::{ModelClient, ModelClientResponse};
use crate::tool::{Executor as ToolExecutor, TOOL_FAILURE_PREFIX, render_result};
pub use builder::AgentBuilder;
use state::{RunState, Stage};
pub use state::StopReason;

/// The turn budget used by [`Agent::run`] unless the builder says
/// otherwise.
pub const DEFAULT_MAX_TURNS: usize = 10;

const PREVIEW_CHARS: usize = 100;

/// An agent: a model, a system prompt and a set of tools, driven through a
/// bounded tool-calling loop.
///
/// The agent itself is immutable. Every run starts a fresh transcript, so
/// the same agent can be run any number of times.
pub struct Agent {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    tool_schemas: Vec<ToolSchema>,
    system_prompt: String,
    temperature: Option<f32>,
    max_turns: usize,
}

/// The result of a completed run.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    /// The final answer, possibly empty.
    pub answer: String,
    /// Every message exchanged during the run.
    pub transcript: Transcript,
    /// How many model requests were made.
    pub turns: usize,
    /// Why the run stopped.
    pub stop: StopReason,
}

impl Agent {
    /// Returns the default turn budget.
    #[inline]
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Returns the tool schemas advertised to the model.
    #[inline]
    pub fn tool_schemas(&self) -> &[ToolSchema] {
        &self.tool_schemas
    }

    /// Runs the loop on `input` with the default turn budget and returns
    /// the final answer.
    pub async fn run(&self, input: &str) -> Result<String, Error> {
        self.run_with_max_turns(input, self.max_turns).await
    }

    /// Runs the loop on `input` with an explicit turn budget.
    pub async fn run_with_max_turns(
        &self,
        input: &str,
        max_turns: usize,
    ) -> Result<String, Error> {
        let outcome = self.run_to_outcome(input, max_turns).await?;
        Ok(outcome.answer)
    }

    /// Runs the loop and returns the answer together with the transcript.
    ///
    /// Each turn sends the whole transcript to the model and appends its
    /// reply. Requested tool calls are executed in order and their results
    /// appended before the next turn; text ends the run when the model
    /// reports `stop`, and a reply with neither ends it unconditionally.
    /// Running out of turns returns the latest text the model produced.
    pub async fn run_to_outcome(
        &self,
        input: &str,
        max_turns: usize,
    ) -> Result<RunOutcome, Error> {
        let mut transcript = Transcript::new(&self.system_prompt, input);
        let mut state = RunState::new();

        for turn in 0..max_turns {
            let request = self.build_model_request(&transcript);
            let ModelClientResponse {
                content,
                tool_calls,
                finish_reason,
            } = self
                .model_client
                .send_request(request)
                .await
                .map_err(|err| Error::from_provider(&*err))?;
            log_reply(turn, &content);

            state.on_reply(&content, &tool_calls, finish_reason);
            let content = (!content.is_empty()).then_some(content);
            transcript.push_assistant(content, tool_calls.clone());

            match state.stage() {
                Stage::DispatchingTools => {
                    for call in tool_calls {
                        let output = self.dispatch(&call).await;
                        transcript.push_tool_result(call.id, output);
                    }
                    state.on_tools_dispatched();
                }
                Stage::Done(stop) => {
                    debug!("run finished after {} turns: {stop:?}", turn + 1);
                    return Ok(RunOutcome {
                        answer: state.into_candidate(),
                        transcript,
                        turns: turn + 1,
                        stop,
                    });
                }
                Stage::AwaitingModel => {}
            }
        }

        if max_turns > 0 {
            warn!("run reached the turn limit of {max_turns}");
        }
        Ok(RunOutcome {
            answer: state.into_candidate(),
            transcript,
            turns: max_turns,
            stop: StopReason::TurnLimit,
        })
    }

    fn build_model_request(&self, transcript: &Transcript) -> ModelRequest {
        ModelRequest {
            messages: transcript.messages().to_vec(),
            tools: self.tool_schemas.clone(),
            temperature: self.temperature,
        }
    }

    async fn dispatch(&self, call: &ToolCallRequest) -> String {
        let arguments = match serde_json::from_str::<Value>(&call.arguments) {
            Ok(arguments) => arguments,
            Err(err) => {
                warn!(
                    "unparsable arguments for {} ({}): {err}",
                    call.name, call.id
                );
                return format!("{TOOL_FAILURE_PREFIX}{err}");
            }
        };
        let result = self.tool_executor.execute(&call.name, arguments).await;
        if let Err(err) = &result {
            warn!("tool {} ({}) failed: {err}", call.name, call.id);
        }
        render_result(result)
    }
}

fn log_reply(turn: usize, content: &str) {
    if content.is_empty() {
        info!("turn {turn}: tool call");
        return;
    }
    let preview: String = content.chars().take(PREVIEW_CHARS).collect();
    info!("turn {turn}: raw output: {preview}...");
}
