//! The `OpenAIClient` struct implements [`ClientWrapper`] for OpenAI's Chat
//! Completions API with native function calling, capturing both the
//! assistant response (text and/or requested tool calls) and token usage.
//!
//! # Key Features
//!
//! - **Native tool calling**: tool definitions are forwarded as
//!   `tools: [{type: "function", ...}]` and the `tool_choice` policy maps
//!   straight onto the API's `"auto"`/`"none"` values.
//! - **Automatic usage capture**: stores the latest [`TokenUsage`]
//!   internally; call `get_last_usage()` after `send_message()`.
//! - **Custom endpoints**: `new_with_base_url` targets any OpenAI
//!   compatible deployment.
//!
//! The wire handling is done directly with `reqwest` so the request body
//! can carry the tool-calling fields.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use crate::pokechat::client_wrapper::{
    ClientWrapper, Message, Role, TokenUsage, ToolCall, ToolChoice, ToolDefinition,
};
use crate::pokechat::clients::common::get_shared_http_client;
use crate::pokechat::error::ChatError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client wrapper for OpenAI's Chat Completions API.
///
/// The wrapper maintains the selected model identifier plus an internal
/// [`TokenUsage`] slot so callers can inspect how many tokens each request
/// consumed. It reuses the shared pooled HTTP client.
pub struct OpenAIClient {
    /// Model name that will be injected into each request.
    model: String,
    /// Bearer token for the API.
    secret_key: String,
    /// Base URL of the Chat Completions deployment.
    base_url: String,
    /// Upper bound for each HTTP round trip.
    request_timeout: Duration,
    /// Storage for the token usage returned by the most recent request.
    token_usage: Mutex<Option<TokenUsage>>,
}

impl OpenAIClient {
    /// Construct a new client using the provided API key and model name.
    pub fn new_with_model_string(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, DEFAULT_BASE_URL)
    }

    /// Construct a client targeting a custom OpenAI compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        OpenAIClient {
            model: model_name.to_string(),
            secret_key: secret_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_usage: Mutex::new(None),
        }
    }

    /// Override the default request timeout for subsequent calls.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn encode_message(msg: &Message) -> serde_json::Value {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        let mut encoded = json!({ "role": role, "content": msg.content });
        if !msg.tool_calls.is_empty() {
            encoded["tool_calls"] = msg
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": { "name": call.name, "arguments": call.arguments },
                    })
                })
                .collect();
        }
        if let Some(call_id) = &msg.tool_call_id {
            encoded["tool_call_id"] = json!(call_id);
        }
        encoded
    }
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[async_trait]
impl ClientWrapper for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<Message, ChatError> {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(Self::encode_message).collect::<Vec<_>>(),
        });
        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| json!({ "type": "function", "function": t }))
                .collect();
            body["tool_choice"] = json!(tool_choice.as_str());
        }

        let url = format!("{}/chat/completions", self.base_url);
        let response = get_shared_http_client()
            .post(&url)
            .bearer_auth(&self.secret_key)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("OpenAIClient::send_message(...): request failed: {}", e);
                ChatError::Model(format!("request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            log::error!(
                "OpenAIClient::send_message(...): API returned {}: {}",
                status,
                detail
            );
            return Err(ChatError::Model(format!(
                "model endpoint returned status {}",
                status
            )));
        }

        let parsed: WireResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Protocol(format!("undecodable model reply: {}", e)))?;

        if let Some(usage) = parsed.usage {
            *self.token_usage.lock().await = Some(TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            });
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Protocol("model reply carried no choices".to_string()))?;

        Ok(Message {
            role: Role::Assistant,
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice
                .message
                .tool_calls
                .into_iter()
                .map(|c| ToolCall {
                    id: c.id,
                    name: c.function.name,
                    arguments: c.function.arguments,
                })
                .collect(),
            tool_call_id: None,
        })
    }

    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        Some(&self.token_usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_tool_calls_are_encoded_as_functions() {
        let msg = Message {
            role: Role::Assistant,
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "c1".into(),
                name: "get_pokemon".into(),
                arguments: "{\"name_or_id\":\"pikachu\"}".into(),
            }],
            tool_call_id: None,
        };
        let encoded = OpenAIClient::encode_message(&msg);
        assert_eq!(encoded["role"], "assistant");
        assert_eq!(encoded["tool_calls"][0]["id"], "c1");
        assert_eq!(encoded["tool_calls"][0]["type"], "function");
        assert_eq!(encoded["tool_calls"][0]["function"]["name"], "get_pokemon");
    }

    #[test]
    fn tool_messages_carry_their_call_id() {
        let encoded = OpenAIClient::encode_message(&Message::tool_result("c7", "2.0x"));
        assert_eq!(encoded["role"], "tool");
        assert_eq!(encoded["tool_call_id"], "c7");
        assert_eq!(encoded["content"], "2.0x");
    }

    #[test]
    fn wire_response_decodes_tool_calls() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "get_type_effectiveness", "arguments": "{}" }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
        });
        let parsed: WireResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.choices[0].message.tool_calls[0].id, "call_1");
        assert_eq!(parsed.usage.as_ref().unwrap().total_tokens, 15);
    }
}
