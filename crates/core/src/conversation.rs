//! Conversation-related types.

use specgen_model::{
    AssistantMessage, ModelMessage, ToolCallRequest, ToolCallResult,
};

/// The ordered messages of one agent run.
///
/// A transcript is append-only and always starts with the system prompt
/// followed by the user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ModelMessage>,
}

impl Transcript {
    pub(crate) fn new(system_prompt: &str, user_input: &str) -> Self {
        Self {
            messages: vec![
                ModelMessage::System(system_prompt.to_owned()),
                ModelMessage::User(user_input.to_owned()),
            ],
        }
    }

    pub(crate) fn push_assistant(
        &mut self,
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) {
        self.messages.push(ModelMessage::Assistant(AssistantMessage {
            content,
            tool_calls,
        }));
    }

    pub(crate) fn push_tool_result(&mut self, id: String, content: String) {
        self.messages
            .push(ModelMessage::Tool(ToolCallResult { id, content }));
    }

    /// Returns the messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Returns the number of messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages, which never happens for a
    /// transcript created by an agent run.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns the tool call ids that have no result right after the
    /// assistant message that requested them.
    ///
    /// Results must follow their request before any other assistant
    /// message, so for a transcript produced by a completed run this is
    /// always empty.
    pub fn unanswered_tool_calls(&self) -> Vec<&str> {
        let mut unanswered = vec![];
        let mut pending: Vec<&str> = vec![];
        for msg in &self.messages {
            match msg {
                ModelMessage::Assistant(reply) => {
                    unanswered.append(&mut pending);
                    pending = reply
                        .tool_calls
                        .iter()
                        .map(|call| call.id.as_str())
                        .collect();
                }
                ModelMessage::Tool(result) => {
                    if let Some(idx) =
                        pending.iter().position(|id| *id == result.id)
                    {
                        pending.remove(idx);
                    }
                }
                _ => {}
            }
        }
        unanswered.append(&mut pending);
        unanswered
    }
}
