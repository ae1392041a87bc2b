use specgen_model::{ModelFinishReason, ToolCallRequest};

/// Why an agent run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The model replied with text and said it was done.
    Finished,
    /// The model replied with neither text nor tool calls.
    EmptyReply,
    /// The turn budget ran out. This is not an error, the last text the
    /// model produced is still returned.
    TurnLimit,
}

/// The stage an agent run is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    AwaitingModel,
    DispatchingTools,
    Done(StopReason),
}

/// Bookkeeping for one run: the current stage and the candidate answer.
#[derive(Debug)]
pub struct RunState {
    stage: Stage,
    candidate: String,
}

impl RunState {
    #[inline]
    pub fn new() -> Self {
        Self {
            stage: Stage::AwaitingModel,
            candidate: String::new(),
        }
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Moves to the next stage after an assistant reply.
    ///
    /// Tool calls take precedence: text that comes along with them is
    /// not considered an answer.
    pub fn on_reply(
        &mut self,
        content: &str,
        tool_calls: &[ToolCallRequest],
        finish_reason: Option<ModelFinishReason>,
    ) {
        debug_assert_eq!(self.stage, Stage::AwaitingModel);
        if !tool_calls.is_empty() {
            self.stage = Stage::DispatchingTools;
        } else if !content.is_empty() {
            content.clone_into(&mut self.candidate);
            if finish_reason == Some(ModelFinishReason::Stop) {
                self.stage = Stage::Done(StopReason::Finished);
            }
        } else {
            self.stage = Stage::Done(StopReason::EmptyReply);
        }
    }

    #[inline]
    pub fn on_tools_dispatched(&mut self) {
        debug_assert_eq!(self.stage, Stage::DispatchingTools);
        self.stage = Stage::AwaitingModel;
    }

    #[inline]
    pub fn into_candidate(self) -> String {
        self.candidate
    }
}
