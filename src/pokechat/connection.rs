//! Per-connection lifecycle management.
//!
//! Every accepted WebSocket gets its own [`SessionChannel`], created eagerly
//! on accept and released on every exit path: normal close, exit keyword,
//! protocol error, or an error mid-teardown. Sessions are never stored in
//! shared process state, so concurrent connections cannot tear down each
//! other's channels.
//!
//! The turn-handling core ([`handle_turn`]) is independent of the socket so
//! the exit-keyword and error-reporting behavior is testable without a
//! network.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use crate::pokechat::config::ChatConfig;
use crate::pokechat::orchestrator::ChatOrchestrator;
use crate::pokechat::session_channel::{HttpToolTransport, SessionChannel};

/// Text sent in reply to an exit keyword, just before the close.
pub const GOODBYE_MESSAGE: &str = "Goodbye! Good luck with your battles!";

/// Outcome of one conversational turn.
#[derive(Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Send this text and keep the connection open.
    Reply(String),
    /// Send the goodbye text and close the connection.
    Goodbye,
}

/// An exit keyword ends the connection without starting a query cycle.
/// Matching is case-insensitive on the trimmed input.
pub fn is_exit_command(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "quit" | "exit")
}

/// Run one turn: exit keywords short-circuit before the orchestrator is
/// invoked; cycle errors become in-band replies so the connection survives
/// them.
pub async fn handle_turn(
    orchestrator: &ChatOrchestrator,
    session: &mut SessionChannel,
    input: &str,
) -> TurnOutcome {
    if is_exit_command(input) {
        return TurnOutcome::Goodbye;
    }

    match orchestrator.process_query(session, input).await {
        Ok(answer) => TurnOutcome::Reply(answer),
        Err(e) => {
            log::error!("query cycle failed: {}", e);
            TurnOutcome::Reply(format!("Error processing query: {}", e))
        }
    }
}

/// Serve one accepted WebSocket until it closes.
///
/// Establishes the session before the welcome message so the first query
/// already has tools available; guarantees the session is released no matter
/// how the loop exits.
pub async fn serve_socket(
    socket: WebSocket,
    orchestrator: Arc<ChatOrchestrator>,
    config: Arc<ChatConfig>,
) {
    let connection_id = Uuid::new_v4();
    log::info!("connection {} accepted", connection_id);

    let (mut sink, mut stream) = socket.split();

    let transport =
        HttpToolTransport::with_timeout(config.tool_host_url.clone(), config.request_timeout);
    let mut session = match SessionChannel::connect(Box::new(transport)).await {
        Ok(session) => session,
        Err(e) => {
            log::error!("connection {}: session setup failed: {}", connection_id, e);
            let _ = sink
                .send(WsMessage::Text(
                    format!("Error: could not reach the battle tools: {}", e).into(),
                ))
                .await;
            let _ = sink.close().await;
            return;
        }
    };

    if sink
        .send(WsMessage::Text(config.welcome_message.clone().into()))
        .await
        .is_err()
    {
        session.close().await;
        return;
    }

    while let Some(incoming) = stream.next().await {
        let message = match incoming {
            Ok(message) => message,
            Err(e) => {
                log::warn!("connection {}: receive error: {}", connection_id, e);
                break;
            }
        };

        let text = match message {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            // Pings are answered by axum itself; other frames are ignored.
            _ => continue,
        };

        match handle_turn(&orchestrator, &mut session, text.as_str()).await {
            TurnOutcome::Reply(answer) => {
                if sink.send(WsMessage::Text(answer.into())).await.is_err() {
                    break;
                }
            }
            TurnOutcome::Goodbye => {
                let _ = sink
                    .send(WsMessage::Text(GOODBYE_MESSAGE.to_string().into()))
                    .await;
                break;
            }
        }
    }

    session.close().await;
    let _ = sink.close().await;
    log::info!("connection {} closed", connection_id);
}
