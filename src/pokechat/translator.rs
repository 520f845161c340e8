//! Translation between the tool host's descriptors and the model's
//! function-calling schema, and execution of the calls the model requests.
//!
//! The mapping is 1:1 — no filtering or renaming — so the model sees exactly
//! the tools the session reports. Requested calls are executed strictly
//! sequentially in the order the model emitted them: a later call's
//! arguments may depend on an earlier call in user intent, and sequential
//! execution keeps failure attribution simple.
//!
//! Failure policy (applied here and nowhere else): a call naming a tool the
//! session does not know aborts the whole cycle with
//! [`ChatError::ToolExecution`]; a *known* tool that fails — malformed
//! arguments, transport error, or a remote-reported failure — is folded into
//! its Tool message as error text so the final model call can acknowledge
//! it. Failures are never presented as successful empty results.

use crate::pokechat::client_wrapper::{Message, ToolCall, ToolDefinition};
use crate::pokechat::error::ChatError;
use crate::pokechat::session_channel::SessionChannel;
use crate::pokechat::tool_protocol::ToolMetadata;

/// Map the session's tool descriptors into the schema format offered to the
/// model, preserving order.
pub fn to_model_schema(tools: &[ToolMetadata]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|tool| ToolDefinition {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema(),
        })
        .collect()
}

/// Execute every requested call in emitted order and return the Tool
/// messages to append to the conversation, one per call, each tagged with
/// its originating call id.
pub async fn execute_requested_calls(
    session: &SessionChannel,
    calls: &[ToolCall],
) -> Result<Vec<Message>, ChatError> {
    let mut results = Vec::with_capacity(calls.len());

    for call in calls {
        if !session.known_tools().iter().any(|t| t.name == call.name) {
            return Err(ChatError::ToolExecution {
                name: call.name.clone(),
                cause: "not present in the session's tool set".to_string(),
            });
        }

        let content = match serde_json::from_str::<serde_json::Value>(&call.arguments) {
            Ok(arguments) => {
                log::info!("executing tool {} with arguments {}", call.name, arguments);
                match session.invoke(&call.name, arguments).await {
                    Ok(result) => result.into_content(),
                    Err(e) => {
                        log::warn!("tool {} failed: {}", call.name, e);
                        format!("Error: {}", e)
                    }
                }
            }
            Err(e) => {
                log::warn!("tool {} got undecodable arguments: {}", call.name, e);
                format!("Error: arguments were not valid JSON: {}", e)
            }
        };

        results.push(Message::tool_result(call.id.clone(), content));
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pokechat::client_wrapper::Role;
    use crate::pokechat::session_channel::ToolTransport;
    use crate::pokechat::tool_protocol::{ToolParameter, ToolParameterType, ToolResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedTransport {
        invocations: Mutex<Vec<(String, serde_json::Value)>>,
        fail_invoke: bool,
    }

    #[async_trait]
    impl ToolTransport for ScriptedTransport {
        async fn open(&mut self) -> Result<(), ChatError> {
            Ok(())
        }

        async fn fetch_tools(&self) -> Result<Vec<ToolMetadata>, ChatError> {
            Ok(vec![
                ToolMetadata::new("get_type_effectiveness", "Type chart lookup").with_parameter(
                    ToolParameter::new("attacking_type", ToolParameterType::String).required(),
                ),
                ToolMetadata::new("get_pokemon", "Pokédex lookup"),
            ])
        }

        async fn invoke(
            &self,
            name: &str,
            arguments: serde_json::Value,
        ) -> Result<ToolResult, ChatError> {
            self.invocations
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            if self.fail_invoke {
                return Err(ChatError::ToolExecution {
                    name: name.to_string(),
                    cause: "host unreachable".into(),
                });
            }
            Ok(ToolResult::success(serde_json::json!({ "tool": name })))
        }

        async fn close(&mut self) -> Result<(), ChatError> {
            Ok(())
        }
    }

    async fn ready_session(fail_invoke: bool) -> SessionChannel {
        SessionChannel::connect(Box::new(ScriptedTransport {
            invocations: Mutex::new(Vec::new()),
            fail_invoke,
        }))
        .await
        .unwrap()
    }

    #[test]
    fn schema_mapping_is_one_to_one_and_ordered() {
        let tools = vec![
            ToolMetadata::new("a", "first"),
            ToolMetadata::new("b", "second"),
        ];
        let schema = to_model_schema(&tools);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].name, "a");
        assert_eq!(schema[1].name, "b");
        assert_eq!(schema[0].parameters["type"], "object");
    }

    #[tokio::test]
    async fn results_are_tagged_and_ordered() {
        let session = ready_session(false).await;
        let calls = vec![
            ToolCall {
                id: "c1".into(),
                name: "get_type_effectiveness".into(),
                arguments: "{\"attacking_type\":\"fire\"}".into(),
            },
            ToolCall {
                id: "c2".into(),
                name: "get_pokemon".into(),
                arguments: "{}".into(),
            },
        ];

        let messages = execute_requested_calls(&session, &calls).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("c2"));
        assert!(messages.iter().all(|m| m.role == Role::Tool));
    }

    #[tokio::test]
    async fn unresolved_tool_name_aborts_the_cycle() {
        let session = ready_session(false).await;
        let calls = vec![ToolCall {
            id: "c1".into(),
            name: "summon_arceus".into(),
            arguments: "{}".into(),
        }];

        let err = execute_requested_calls(&session, &calls).await.unwrap_err();
        match err {
            ChatError::ToolExecution { name, .. } => assert_eq!(name, "summon_arceus"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn known_tool_failure_is_folded_into_the_result() {
        let session = ready_session(true).await;
        let calls = vec![ToolCall {
            id: "c1".into(),
            name: "get_pokemon".into(),
            arguments: "{}".into(),
        }];

        let messages = execute_requested_calls(&session, &calls).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.starts_with("Error:"));
        assert!(messages[0].content.contains("host unreachable"));
    }

    #[tokio::test]
    async fn undecodable_arguments_are_folded_not_fatal() {
        let session = ready_session(false).await;
        let calls = vec![ToolCall {
            id: "c1".into(),
            name: "get_pokemon".into(),
            arguments: "not json".into(),
        }];

        let messages = execute_requested_calls(&session, &calls).await.unwrap();
        assert!(messages[0].content.contains("not valid JSON"));
    }
}
