//! The conversation orchestrator: one user utterance in, one answer out.
//!
//! Each query runs a bounded cycle of at most two model round trips:
//!
//! ```text
//! Drafting → AwaitingFirstModelReply → (no tool calls → Done)
//!                                    | (tool calls → ExecutingTools
//!                                       → AwaitingFinalModelReply → Done)
//! ```
//!
//! The first call offers the session's tools with `tool_choice: auto`; if
//! the assistant requests calls they are executed sequentially and their
//! results appended as Tool messages, then a second call is made with
//! `tool_choice: none`, forcing a natural-language synthesis instead of
//! another round of calls. Capping tool use at one round keeps latency and
//! the failure surface predictable.
//!
//! The conversation is built fresh for every cycle and discarded at its
//! end — there is no cross-request memory.

use std::sync::Arc;

use crate::pokechat::client_wrapper::{ClientWrapper, Message, Role, ToolChoice};
use crate::pokechat::error::ChatError;
use crate::pokechat::session_channel::SessionChannel;
use crate::pokechat::translator;

/// Drives query cycles against an injected model client. The session
/// channel is passed in per call — it is owned by the connection, not by
/// the orchestrator.
pub struct ChatOrchestrator {
    client: Arc<dyn ClientWrapper>,
    system_prompt: String,
}

impl ChatOrchestrator {
    pub fn new(client: Arc<dyn ClientWrapper>, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
        }
    }

    /// Run one full cycle for `query` and return the final answer text.
    ///
    /// Any error returned here is fatal to this cycle only; the caller
    /// reports it in-band and keeps the connection alive.
    pub async fn process_query(
        &self,
        session: &mut SessionChannel,
        query: &str,
    ) -> Result<String, ChatError> {
        // Tool discovery failure is fatal to the cycle: the model must see
        // exactly the tools the session currently reports, or nothing.
        let tools = session.list_tools().await?;
        let schema = translator::to_model_schema(&tools);
        log::info!("offering {} tool(s) to model {}", schema.len(), self.client.model_name());

        let mut messages = Vec::new();
        if !self.system_prompt.is_empty() {
            messages.push(Message::text(Role::System, self.system_prompt.clone()));
        }
        messages.push(Message::text(Role::User, query));

        let assistant = self
            .client
            .send_message(&messages, &schema, ToolChoice::Auto)
            .await?;

        if assistant.tool_calls.is_empty() {
            log::info!("no tool calls requested, returning direct response");
            return Ok(assistant.content);
        }

        log::info!("model requested {} tool call(s)", assistant.tool_calls.len());
        let calls = assistant.tool_calls.clone();
        messages.push(assistant);
        messages.extend(translator::execute_requested_calls(session, &calls).await?);

        let final_reply = self
            .client
            .send_message(&messages, &schema, ToolChoice::None)
            .await?;
        Ok(final_reply.content)
    }
}
