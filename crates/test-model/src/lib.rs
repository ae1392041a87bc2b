//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use specgen_model::{
    ErrorKind, ModelMessage, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: VecDeque<ModelResponseEvent>,
}

#[async_trait]
impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    async fn next_event(
        &mut self,
    ) -> Result<Option<ModelResponseEvent>, Self::Error> {
        Ok(self.events.pop_front())
    }
}

/// A local fake model for testing purpose.
///
/// The script holds one preset per assistant turn. The preset is picked by
/// counting the assistant messages already present in the request, so a
/// fresh conversation always gets the first preset, the request after one
/// assistant reply gets the second, and so on. If the script runs out, an
/// error is returned.
///
/// Every request is recorded and can be inspected with
/// [`TestModelProvider::requests`]. Clones share the recording.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<PresetResponse>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    /// Creates a provider that answers with the given presets in order.
    #[inline]
    pub fn with_script(script: impl Into<Vec<PresetResponse>>) -> Self {
        Self {
            script: script.into(),
            requests: Default::default(),
        }
    }

    /// Returns a copy of every request received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Returns how many requests were received so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    fn respond(&self, req: &ModelRequest) -> Result<TestModelResponse, Error> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req.clone());
        }

        let turn = req
            .messages
            .iter()
            .filter(|msg| matches!(msg, ModelMessage::Assistant(_)))
            .count();
        let Some(preset) = self.script.get(turn) else {
            return Err(Error {
                message: "not enough steps",
                kind: ErrorKind::Other,
            });
        };
        if let Some(kind) = preset.failure {
            return Err(Error {
                message: "scripted failure",
                kind,
            });
        }

        let mut events: VecDeque<_> = preset
            .events
            .iter()
            .map(|event| match event {
                PresetEvent::MessageDelta(msg) => {
                    ModelResponseEvent::MessageDelta(msg.clone())
                }
                PresetEvent::ToolCall(req) => {
                    ModelResponseEvent::ToolCall(req.clone())
                }
            })
            .collect();
        if let Some(reason) = preset.resolved_finish_reason() {
            events.push_back(ModelResponseEvent::Completed(reason));
        }
        Ok(TestModelResponse { events })
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        ready(self.respond(req))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use specgen_model::{
        AssistantMessage, ModelFinishReason, ToolCallRequest, ToolSchema,
    };

    use super::*;

    async fn collect_response(
        mut resp: TestModelResponse,
    ) -> (String, Option<ToolCallRequest>, Option<ModelFinishReason>) {
        let mut msg = String::new();
        let mut tool_call = None;
        let mut reason = None;
        while let Some(event) = resp.next_event().await.unwrap() {
            match event {
                ModelResponseEvent::Completed(r) => reason = Some(r),
                ModelResponseEvent::MessageDelta(delta) => {
                    msg.push_str(&delta);
                }
                ModelResponseEvent::ToolCall(req) => tool_call = Some(req),
            }
        }
        (msg, tool_call, reason)
    }

    #[tokio::test]
    async fn test_send_request() {
        let provider = TestModelProvider::with_script([
            PresetResponse::with_events([
                PresetEvent::MessageDelta("Sure, ".to_owned()),
                PresetEvent::MessageDelta("let me take a look.".to_owned()),
                PresetEvent::ToolCall(ToolCallRequest {
                    id: "call_1".to_owned(),
                    name: "bash_command".to_owned(),
                    arguments: json!({ "command": "cat spec.txt" })
                        .to_string(),
                }),
            ]),
            PresetResponse::text("All done."),
        ]);

        let mut req = ModelRequest {
            messages: vec![ModelMessage::User("Read the spec".to_owned())],
            tools: vec![ToolSchema::function(
                "bash_command",
                "Runs a command",
                json!({ "type": "object" }),
            )],
            temperature: Some(0.1),
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call, reason) = collect_response(resp).await;
        assert_eq!(msg, "Sure, let me take a look.");
        let tool_call = tool_call.unwrap();
        assert_eq!(tool_call.name, "bash_command");
        assert_eq!(reason, Some(ModelFinishReason::ToolCalls));

        req.messages.push(ModelMessage::Assistant(AssistantMessage {
            content: Some(msg),
            tool_calls: vec![tool_call],
        }));
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call, reason) = collect_response(resp).await;
        assert_eq!(msg, "All done.");
        assert!(tool_call.is_none());
        assert_eq!(reason, Some(ModelFinishReason::Stop));

        assert_eq!(provider.request_count(), 2);
        assert_eq!(provider.requests()[1].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_script_exhausted() {
        let provider = TestModelProvider::default();
        let req = ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
            temperature: None,
        };
        let err = provider.send_request(&req).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let provider = TestModelProvider::with_script([
            PresetResponse::failing(ErrorKind::RateLimitExceeded),
        ]);
        let req = ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
            temperature: None,
        };
        let err = provider.send_request(&req).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    }
}
