//! A ClientWrapper is a wrapper around a specific cloud LLM service.
//! It provides a common interface to interact with the LLMs, including
//! native tool calling: callers offer a set of tool definitions and a
//! [`ToolChoice`] policy, and the returned assistant message may carry the
//! tool calls the model requested instead of (or alongside) plain text.
//!
//! The wrapper itself is stateless with respect to the conversation; the
//! orchestrator owns the message history for each query cycle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::pokechat::error::ChatError;

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Set by the developer to steer the model's responses.
    System,
    /// A message sent by a human user (or app user).
    User,
    /// Content generated by the model in response to a user message.
    Assistant,
    /// The result of a tool call, tagged with the originating call id.
    Tool,
}

/// A tool invocation requested by the model: an opaque id assigned by the
/// model, the tool name, and the arguments as a raw JSON-encoded string
/// (the form the Chat Completions API emits them in).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// Represents a generic message to be sent to an LLM.
#[derive(Clone, Debug)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: String,
    /// Tool calls requested by the model. Only ever non-empty on
    /// assistant messages.
    pub tool_calls: Vec<ToolCall>,
    /// For [`Role::Tool`] messages, the id of the call this result answers.
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Plain text message with no tool payload.
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Tool-result message tagged with the originating call id.
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool surfaced to the model, in the function-calling schema the Chat
/// Completions API expects: name, description, and a JSON-schema object
/// describing the parameters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Whether the model is permitted to request tool calls for this request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to answer directly or call tools.
    Auto,
    /// Tool use disabled — forces a natural-language answer.
    None,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::Auto => "auto",
            ToolChoice::None => "none",
        }
    }
}

/// How many tokens were spent on prompt vs. completion.
#[derive(Clone, Debug)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub total_tokens: usize,
}

/// Trait defining the interface to interact with various LLM services.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// The model identifier injected into each request.
    fn model_name(&self) -> &str;

    /// Send a message exchange to the LLM and get exactly one assistant
    /// message back. `tools` is the full set offered for this request and
    /// `tool_choice` controls whether the model may use them.
    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<Message, ChatError>;

    /// Hook to retrieve usage from the *last* send_message() call.
    /// Default impl returns None so wrappers without accounting don't break.
    async fn get_last_usage(&self) -> Option<TokenUsage> {
        match self.usage_slot() {
            Some(slot) => slot.lock().await.clone(),
            None => None,
        }
    }

    /// Implementations supporting token accounting override this to expose
    /// their internal usage slot.
    fn usage_slot(&self) -> Option<&Mutex<Option<TokenUsage>>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("call_42", "4.0x");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_42"));
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn tool_choice_serializes_to_api_strings() {
        assert_eq!(ToolChoice::Auto.as_str(), "auto");
        assert_eq!(ToolChoice::None.as_str(), "none");
    }
}
