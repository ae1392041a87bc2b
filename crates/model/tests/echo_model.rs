use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;

use async_trait::async_trait;
use specgen_model::{
    AssistantMessage, ErrorKind, ModelFinishReason, ModelMessage,
    ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
    ModelResponseEvent, ToolCallRequest,
};

#[derive(Debug)]
struct EchoError(ErrorKind);

impl Display for EchoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for EchoError {}

impl ModelProviderError for EchoError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message word by word, or asks for the `think`
/// tool when the message starts with `think:`.
struct EchoResponse {
    events: VecDeque<ModelResponseEvent>,
}

#[async_trait]
impl ModelResponse for EchoResponse {
    type Error = EchoError;

    async fn next_event(
        &mut self,
    ) -> Result<Option<ModelResponseEvent>, Self::Error> {
        Ok(self.events.pop_front())
    }
}

struct EchoProvider;

impl ModelProvider for EchoProvider {
    type Error = EchoError;
    type Response = EchoResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let last_user = req.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.clone()),
            _ => None,
        });
        let result = match last_user {
            None => Err(EchoError(ErrorKind::InvalidResponse)),
            Some(text) => {
                let mut events = VecDeque::new();
                if let Some(thought) = text.strip_prefix("think:") {
                    events.push_back(ModelResponseEvent::ToolCall(
                        ToolCallRequest {
                            id: "call_0".to_owned(),
                            name: "think".to_owned(),
                            arguments: serde_json::json!({
                                "thought": thought.trim()
                            })
                            .to_string(),
                        },
                    ));
                    events.push_back(ModelResponseEvent::Completed(
                        ModelFinishReason::ToolCalls,
                    ));
                } else {
                    for word in text.split_inclusive(' ') {
                        events.push_back(ModelResponseEvent::MessageDelta(
                            word.to_owned(),
                        ));
                    }
                    events.push_back(ModelResponseEvent::Completed(
                        ModelFinishReason::Stop,
                    ));
                }
                Ok(EchoResponse { events })
            }
        };
        ready(result)
    }
}

async fn collect(
    mut resp: EchoResponse,
) -> (String, Vec<ToolCallRequest>, Option<ModelFinishReason>) {
    let mut text = String::new();
    let mut calls = vec![];
    let mut reason = None;
    while let Some(event) = resp.next_event().await.unwrap() {
        match event {
            ModelResponseEvent::MessageDelta(delta) => text.push_str(&delta),
            ModelResponseEvent::ToolCall(call) => calls.push(call),
            ModelResponseEvent::Completed(r) => reason = Some(r),
        }
    }
    (text, calls, reason)
}

#[tokio::test]
async fn test_text_completion() {
    let req = ModelRequest {
        messages: vec![
            ModelMessage::System("Echo everything.".to_owned()),
            ModelMessage::User("Good morning to you".to_owned()),
        ],
        tools: vec![],
        temperature: Some(0.1),
    };
    let resp = EchoProvider.send_request(&req).await.unwrap();
    let (text, calls, reason) = collect(resp).await;
    assert_eq!(text, "Good morning to you");
    assert!(calls.is_empty());
    assert_eq!(reason, Some(ModelFinishReason::Stop));
}

#[tokio::test]
async fn test_tool_call_completion() {
    let req = ModelRequest {
        messages: vec![
            ModelMessage::User("hello".to_owned()),
            ModelMessage::Assistant(AssistantMessage {
                content: Some("hello".to_owned()),
                tool_calls: vec![],
            }),
            ModelMessage::User("think: about tests".to_owned()),
        ],
        tools: vec![],
        temperature: None,
    };
    let resp = EchoProvider.send_request(&req).await.unwrap();
    let (text, calls, reason) = collect(resp).await;
    assert!(text.is_empty());
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "think");
    assert_eq!(calls[0].arguments, r#"{"thought":"about tests"}"#);
    assert_eq!(reason, Some(ModelFinishReason::ToolCalls));
}

#[tokio::test]
async fn test_error() {
    let req = ModelRequest {
        messages: vec![],
        tools: vec![],
        temperature: None,
    };
    let err = EchoProvider.send_request(&req).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}
