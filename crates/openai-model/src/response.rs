use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use specgen_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};

use crate::Error;
use crate::io::{Sse, SseError};
use crate::proto::{ChatCompletionChunk, ToolCallDelta};

/// A tool call whose deltas are still arriving.
#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn patch(&mut self, delta: ToolCallDelta) {
        if let Some(id) = delta.id {
            self.id.push_str(&id);
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                self.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                self.arguments.push_str(&arguments);
            }
        }
    }
}

/// A streamed chat completion.
///
/// Message deltas are surfaced as soon as they arrive. Tool calls are only
/// emitted once the stream ends, because their arguments are streamed in
/// fragments and are useless until complete. The finish reason comes last.
pub struct OpenAIResponse {
    sse: Sse,
    chunk_id: Option<String>,
    // Keyed by the `index` the server assigns to each tool call, so the
    // calls are emitted in the order the model issued them.
    tool_calls: BTreeMap<u32, PartialToolCall>,
    finish_reason: Option<ModelFinishReason>,
    pending: VecDeque<ModelResponseEvent>,
    done: bool,
}

impl OpenAIResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        Self {
            sse,
            chunk_id: None,
            tool_calls: Default::default(),
            finish_reason: None,
            pending: Default::default(),
            done: false,
        }
    }

    fn finish(&mut self) {
        self.done = true;
        for (_, call) in std::mem::take(&mut self.tool_calls) {
            self.pending.push_back(ModelResponseEvent::ToolCall(
                ToolCallRequest {
                    id: call.id,
                    name: call.name,
                    arguments: call.arguments,
                },
            ));
        }
        if let Some(reason) = self.finish_reason.take() {
            self.pending.push_back(ModelResponseEvent::Completed(reason));
        }
    }

    fn apply_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), Error> {
        if let Some(err) = chunk.error {
            let message = err
                .message
                .unwrap_or_else(|| "unknown stream error".to_owned());
            return Err(Error::new(message, ErrorKind::Other));
        }
        if let Some(usage) = chunk.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }
        if let Some(id) = chunk.id {
            if self.chunk_id.get_or_insert_with(|| id.clone()) != &id {
                return Err(Error::new(
                    "chunk id mismatch",
                    ErrorKind::InvalidResponse,
                ));
            }
        }

        // Only the first choice is requested, ignore any others.
        let Some(choice) = chunk.choices.into_iter().find(|c| c.index == 0)
        else {
            return Ok(());
        };
        if let Some(delta) = choice.delta {
            if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
                self.pending
                    .push_back(ModelResponseEvent::MessageDelta(content));
            }
            for (position, tool_call) in
                delta.tool_calls.into_iter().flatten().enumerate()
            {
                let index = tool_call.index.unwrap_or(position as u32);
                self.tool_calls.entry(index).or_default().patch(tool_call);
            }
        }
        if let Some(reason) = choice.finish_reason {
            self.finish_reason = Some(ModelFinishReason::from_wire(&reason));
        }
        Ok(())
    }
}

#[async_trait]
impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    async fn next_event(
        &mut self,
    ) -> Result<Option<ModelResponseEvent>, Self::Error> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }
            if self.done {
                return Ok(None);
            }

            let data = match self.sse.next_event().await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    self.finish();
                    continue;
                }
                Err(err) => {
                    self.done = true;
                    let kind = match err {
                        SseError::Chunk(_) => ErrorKind::Transport,
                        SseError::InvalidPayload => ErrorKind::InvalidResponse,
                    };
                    return Err(Error::new(format!("{err:?}"), kind));
                }
            };
            trace!("got sse event: {data}");
            if data == "[DONE]" {
                self.finish();
                continue;
            }

            let chunk = serde_json::from_str::<ChatCompletionChunk>(&data)
                .map_err(|err| {
                    Error::new(format!("{err}"), ErrorKind::InvalidResponse)
                });
            if let Err(err) = chunk.and_then(|chunk| self.apply_chunk(chunk)) {
                self.done = true;
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use bytes::Bytes;

    use super::*;

    fn response_from(body: &'static [u8]) -> OpenAIResponse {
        let chunks: VecDeque<Bytes> =
            VecDeque::from([Bytes::from_static(body)]);
        OpenAIResponse::from_sse(Sse::new(chunks))
    }

    async fn collect(
        mut resp: OpenAIResponse,
    ) -> Result<Vec<ModelResponseEvent>, Error> {
        let mut events = vec![];
        while let Some(event) = resp.next_event().await? {
            events.push(event);
        }
        Ok(events)
    }

    #[tokio::test]
    async fn test_tool_call_stream() {
        let resp = response_from(include_bytes!(
            "../fixtures/tool_call_response.txt"
        ));
        let events = collect(resp).await.unwrap();
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta(
                    "Let me save the spec.".to_owned()
                ),
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_a".to_owned(),
                    name: "think".to_owned(),
                    arguments: r#"{"thought":"plan first"}"#.to_owned(),
                }),
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_b".to_owned(),
                    name: "bash_command".to_owned(),
                    arguments: r#"{"command":"echo ok > spec.txt"}"#
                        .to_owned(),
                }),
                ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
            ]
        );
    }

    #[tokio::test]
    async fn test_text_stream() {
        let resp = response_from(include_bytes!(
            "../fixtures/text_response.txt"
        ));
        let events = collect(resp).await.unwrap();
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta("Specs ".to_owned()),
                ModelResponseEvent::MessageDelta("written.".to_owned()),
                ModelResponseEvent::Completed(ModelFinishReason::Stop),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_error_object() {
        let resp = response_from(
            b"data: {\"id\":\"x\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n\n\
              data: {\"error\":{\"message\":\"upstream overloaded\",\"code\":502}}\n\n",
        );
        let err = collect(resp).await.unwrap_err();
        assert_eq!(err.message(), "upstream overloaded");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let resp = response_from(b"data: {not json}\n\n");
        let err = collect(resp).await.unwrap_err();
        assert_eq!(
            specgen_model::ModelProviderError::kind(&err),
            ErrorKind::InvalidResponse
        );
    }
}
