use serde::{Deserialize, Serialize};
use specgen_model::{ErrorKind, ModelFinishReason, ToolCallRequest};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "message_delta")]
    MessageDelta(String),
    #[serde(rename = "tool_call")]
    ToolCall(ToolCallRequest),
}

/// The preset response for one assistant turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
    /// The finish reason to report. When unset, it is inferred from the
    /// events: `ToolCalls` if any tool call is present, `Stop` otherwise.
    #[serde(default)]
    pub finish_reason: Option<ModelFinishReason>,
    /// Report no finish reason at all, like a stream that was cut short.
    #[serde(default)]
    pub omit_finish_reason: bool,
    /// If set, sending the request fails with this error kind.
    #[serde(skip)]
    pub failure: Option<ErrorKind>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            finish_reason: None,
            omit_finish_reason: false,
            failure: None,
        }
    }

    /// A plain text reply that finishes with `stop`.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::with_events([PresetEvent::MessageDelta(text.into())])
    }

    /// A reply with no content and no tool calls.
    #[inline]
    pub fn empty() -> Self {
        Self::with_events([])
    }

    /// A reply requesting one tool call.
    pub fn tool_call<S1, S2, S3>(id: S1, name: S2, arguments: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::with_events([PresetEvent::ToolCall(ToolCallRequest {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        })])
    }

    /// A request that fails with the given error kind.
    #[inline]
    pub fn failing(kind: ErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Self::empty()
        }
    }

    /// Overrides the reported finish reason.
    #[inline]
    pub fn with_finish_reason(mut self, reason: ModelFinishReason) -> Self {
        self.finish_reason = Some(reason);
        self.omit_finish_reason = false;
        self
    }

    /// Reports no finish reason.
    #[inline]
    pub fn without_finish_reason(mut self) -> Self {
        self.finish_reason = None;
        self.omit_finish_reason = true;
        self
    }

    pub(crate) fn resolved_finish_reason(&self) -> Option<ModelFinishReason> {
        if self.omit_finish_reason {
            return None;
        }
        if let Some(reason) = self.finish_reason {
            return Some(reason);
        }
        let has_tool_call = self
            .events
            .iter()
            .any(|event| matches!(event, PresetEvent::ToolCall(_)));
        Some(if has_tool_call {
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        })
    }
}
