//! End-to-end tests of the query cycle: a scripted model client plus an
//! in-process tool host, no network.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use pokechat::pokechat::client_wrapper::{
    ClientWrapper, Message, Role, ToolCall, ToolChoice, ToolDefinition,
};
use pokechat::pokechat::error::ChatError;
use pokechat::pokechat::orchestrator::ChatOrchestrator;
use pokechat::pokechat::session_channel::{SessionChannel, ToolTransport};
use pokechat::pokechat::tool_protocol::{ToolMetadata, ToolResult};
use pokechat::pokechat::tool_protocols::TypeChartProtocol;
use pokechat::pokechat::tool_server::UnifiedToolServer;

/// Everything observed about one model call.
#[derive(Clone)]
struct RecordedCall {
    messages: Vec<Message>,
    tool_names: Vec<String>,
    tool_choice: ToolChoice,
}

/// Scripted model client: pops a queued reply per call and records what it
/// was asked.
struct MockClient {
    replies: Mutex<VecDeque<Message>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockClient {
    fn scripted(replies: Vec<Message>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn recorded(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientWrapper for MockClient {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn send_message(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<Message, ChatError> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            tool_choice,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ChatError::Internal("mock ran out of scripted replies".to_string()))
    }
}

fn assistant_text(content: &str) -> Message {
    Message::text(Role::Assistant, content)
}

fn assistant_calls(calls: Vec<ToolCall>) -> Message {
    Message {
        role: Role::Assistant,
        content: String::new(),
        tool_calls: calls,
        tool_call_id: None,
    }
}

/// Transport bridging a session straight onto an in-process tool host.
struct InProcessTransport {
    server: UnifiedToolServer,
}

#[async_trait]
impl ToolTransport for InProcessTransport {
    async fn open(&mut self) -> Result<(), ChatError> {
        Ok(())
    }

    async fn fetch_tools(&self) -> Result<Vec<ToolMetadata>, ChatError> {
        Ok(self.server.list_tools().await)
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ChatError> {
        self.server
            .execute(name, arguments)
            .await
            .map_err(|e| ChatError::ToolExecution {
                name: name.to_string(),
                cause: e.to_string(),
            })
    }

    async fn close(&mut self) -> Result<(), ChatError> {
        Ok(())
    }
}

async fn typechart_session() -> SessionChannel {
    let server = UnifiedToolServer::new();
    server
        .register_protocol(Arc::new(TypeChartProtocol))
        .await
        .unwrap();
    SessionChannel::connect(Box::new(InProcessTransport { server }))
        .await
        .unwrap()
}

#[tokio::test]
async fn direct_answer_takes_one_round_trip() {
    let client = MockClient::scripted(vec![assistant_text("Tyranitar is a rock/dark type.")]);
    let orchestrator = ChatOrchestrator::new(client.clone(), "You are a battle expert.");
    let mut session = typechart_session().await;

    let answer = orchestrator
        .process_query(&mut session, "What type is Tyranitar?")
        .await
        .unwrap();

    assert_eq!(answer, "Tyranitar is a rock/dark type.");
    let calls = client.recorded();
    assert_eq!(calls.len(), 1);
    // The session's tools were offered even though none were used.
    assert!(calls[0]
        .tool_names
        .contains(&"get_type_effectiveness".to_string()));
    assert_eq!(calls[0].tool_choice, ToolChoice::Auto);
    assert_eq!(calls[0].messages[0].role, Role::System);
    assert_eq!(calls[0].messages[1].role, Role::User);
}

#[tokio::test]
async fn tool_round_trip_feeds_results_back_tagged() {
    let client = MockClient::scripted(vec![
        assistant_calls(vec![ToolCall {
            id: "c1".into(),
            name: "get_type_effectiveness".into(),
            arguments: json!({"attacking_type": "fire", "defending_types": ["grass", "steel"]})
                .to_string(),
        }]),
        assistant_text("Fire hits Ferrothorn for 4x damage."),
    ]);
    let orchestrator = ChatOrchestrator::new(client.clone(), "You are a battle expert.");
    let mut session = typechart_session().await;

    let answer = orchestrator
        .process_query(&mut session, "How effective are fire moves against Ferrothorn?")
        .await
        .unwrap();

    assert_eq!(answer, "Fire hits Ferrothorn for 4x damage.");
    let calls = client.recorded();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].tool_choice, ToolChoice::Auto);
    // The second call must forbid further tool use.
    assert_eq!(calls[1].tool_choice, ToolChoice::None);

    // [System, User, Assistant(call), Tool(result)]
    let followup = &calls[1].messages;
    assert_eq!(followup.len(), 4);
    assert_eq!(followup[2].role, Role::Assistant);
    assert_eq!(followup[3].role, Role::Tool);
    assert_eq!(followup[3].tool_call_id.as_deref(), Some("c1"));
    // The real chart computed the quad weakness.
    assert!(followup[3].content.contains("4.0"));
}

#[tokio::test]
async fn multiple_calls_run_in_emitted_order() {
    let client = MockClient::scripted(vec![
        assistant_calls(vec![
            ToolCall {
                id: "c1".into(),
                name: "get_type_effectiveness".into(),
                arguments: json!({"attacking_type": "water", "defending_types": ["fire"]})
                    .to_string(),
            },
            ToolCall {
                id: "c2".into(),
                name: "get_defensive_profile".into(),
                arguments: json!({"types": ["grass", "steel"]}).to_string(),
            },
        ]),
        assistant_text("done"),
    ]);
    let orchestrator = ChatOrchestrator::new(client.clone(), "");
    let mut session = typechart_session().await;

    orchestrator
        .process_query(&mut session, "analyze both")
        .await
        .unwrap();

    let followup = &client.recorded()[1].messages;
    // [User, Assistant, Tool(c1), Tool(c2)] with no system prompt configured.
    assert_eq!(followup.len(), 4);
    assert_eq!(followup[2].tool_call_id.as_deref(), Some("c1"));
    assert_eq!(followup[3].tool_call_id.as_deref(), Some("c2"));
}

#[tokio::test]
async fn unresolved_tool_name_fails_the_cycle() {
    let client = MockClient::scripted(vec![assistant_calls(vec![ToolCall {
        id: "c1".into(),
        name: "summon_arceus".into(),
        arguments: "{}".into(),
    }])]);
    let orchestrator = ChatOrchestrator::new(client.clone(), "");
    let mut session = typechart_session().await;

    let err = orchestrator
        .process_query(&mut session, "cheat please")
        .await
        .unwrap_err();

    match err {
        ChatError::ToolExecution { name, .. } => assert_eq!(name, "summon_arceus"),
        other => panic!("unexpected error: {}", other),
    }
    // No second model round trip after the abort.
    assert_eq!(client.recorded().len(), 1);
}

#[tokio::test]
async fn client_errors_propagate_out_of_the_cycle() {
    // Empty script: the first call already errors.
    let client = MockClient::scripted(vec![]);
    let orchestrator = ChatOrchestrator::new(client, "");
    let mut session = typechart_session().await;

    let err = orchestrator
        .process_query(&mut session, "hello")
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Internal(_)));
}
