use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::ModelProviderError;

/// A response from the model provider, consumed as a stream of events.
#[async_trait]
pub trait ModelResponse: Send + 'static {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Pulls out the next event from the response.
    ///
    /// Returns `Ok(None)` once the response has completed. Calling this
    /// method after completion or after an error should keep returning
    /// `Ok(None)`.
    async fn next_event(
        &mut self,
    ) -> Result<Option<ModelResponseEvent>, Self::Error>;
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call a tool.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
    /// The output was cut off by a token limit.
    Length,
    /// The output was withheld by a content filter.
    ContentFilter,
    /// A finish reason this crate doesn't know about.
    Other,
}

impl ModelFinishReason {
    /// Parses the finish reason string used by OpenAI-compatible APIs.
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => ModelFinishReason::Stop,
            "tool_calls" | "function_call" => ModelFinishReason::ToolCalls,
            "length" => ModelFinishReason::Length,
            "content_filter" => ModelFinishReason::ContentFilter,
            _ => ModelFinishReason::Other,
        }
    }
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The JSON-encoded arguments, exactly as the model produced them.
    /// They are not guaranteed to be valid JSON.
    pub arguments: String,
}

/// The event from a model response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// The response has been completed.
    Completed(ModelFinishReason),
    /// Received a message delta.
    MessageDelta(String),
    /// Received a complete tool call request.
    ToolCall(ToolCallRequest),
}
