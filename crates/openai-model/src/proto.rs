use serde::{Deserialize, Serialize};
use serde_json::Value;
use specgen_model::{
    AssistantMessage, ModelMessage, ModelRequest, ToolCallRequest,
};

use crate::OpenAIConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FunctionCallDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ToolCallDelta {
    pub index: Option<u32>,
    pub id: Option<String>,
    pub function: Option<FunctionCallDelta>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
    pub error: Option<StreamError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub delta: Option<Delta>,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

/// An error object some providers embed in the stream after the response
/// has already started.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StreamError {
    pub message: Option<String>,
    pub code: Option<Value>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    name: String,
    arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolCall {
    id: String,
    r#type: &'static str,
    function: FunctionCall,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
    stream: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

// -----------
// Conversions
// -----------

pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req
            .tools
            .iter()
            .map(|schema| schema.as_value().clone())
            .collect(),
        temperature: req.temperature,
        stream_options: Some(StreamOptions {
            include_usage: true,
        }),
        stream: true,
    }
}

fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(AssistantMessage {
            content,
            tool_calls,
        }) => Message::Assistant {
            content: content.clone(),
            tool_calls: tool_calls.iter().map(create_tool_call).collect(),
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
    }
}

fn create_tool_call(req: &ToolCallRequest) -> ToolCall {
    ToolCall {
        id: req.id.clone(),
        r#type: "function",
        function: FunctionCall {
            name: req.name.clone(),
            arguments: req.arguments.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use specgen_model::{ToolCallResult, ToolSchema};

    use super::*;
    use crate::OpenAIConfigBuilder;

    #[test]
    fn test_create_request() {
        let schema = json!({
            "type": "function",
            "function": {
                "name": "bash_command",
                "description": "Runs a shell command.",
                "parameters": {
                    "type": "object",
                    "properties": { "command": { "type": "string" } },
                    "required": ["command"]
                }
            }
        });
        let request = ModelRequest {
            messages: vec![
                ModelMessage::System("You write specs.".to_owned()),
                ModelMessage::User("Save it".to_owned()),
                ModelMessage::Assistant(AssistantMessage {
                    content: None,
                    tool_calls: vec![ToolCallRequest {
                        id: "call_1".to_owned(),
                        name: "bash_command".to_owned(),
                        arguments: r#"{"command":"ls"}"#.to_owned(),
                    }],
                }),
                ModelMessage::Tool(ToolCallResult {
                    id: "call_1".to_owned(),
                    content: "Success (no output)".to_owned(),
                }),
            ],
            tools: vec![ToolSchema::new(schema.clone())],
            temperature: Some(0.1),
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx")
            .with_model("deepseek-chat")
            .build();

        let body = serde_json::to_value(create_request(&request, &config))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "model": "deepseek-chat",
                "messages": [
                    { "role": "system", "content": "You write specs." },
                    { "role": "user", "content": "Save it" },
                    {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "bash_command",
                                "arguments": "{\"command\":\"ls\"}"
                            }
                        }]
                    },
                    {
                        "role": "tool",
                        "tool_call_id": "call_1",
                        "content": "Success (no output)"
                    }
                ],
                "tools": [schema],
                "temperature": 0.1f32,
                "stream_options": { "include_usage": true },
                "stream": true
            })
        );
    }

    #[test]
    fn test_no_tools_omitted() {
        let request = ModelRequest {
            messages: vec![ModelMessage::User("Hi".to_owned())],
            tools: vec![],
            temperature: None,
        };
        let config = OpenAIConfigBuilder::with_api_key("xxx").build();
        let body = serde_json::to_value(create_request(&request, &config))
            .unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("temperature").is_none());
    }
}
