//! # PokeChat
//!
//! A tool-augmented Pokémon battle-strategy chat assistant. A WebSocket chat
//! front end connects a large language model to a fixed set of
//! remote-callable battle tools so the model answers competitive questions
//! from grounded data instead of from memory.
//!
//! The crate builds two binaries:
//!
//! * `tool_server` — the tool host: type-chart calculations, cached Pokédex
//!   lookups, role classification, and team/matchup analysis behind
//!   `GET /tools` + `POST /execute`.
//! * `chat_server` — the chat front end: per-connection WebSocket sessions
//!   driving the bounded tool-calling cycle against an OpenAI-compatible
//!   model endpoint.
//!
//! ## The query cycle
//!
//! ```text
//! user text → model (tools offered, tool_choice: auto)
//!           → [tool calls?] → execute sequentially → Tool messages
//!           → model (tool_choice: none) → final answer
//! ```
//!
//! Each cycle is at most two model round trips; the conversation is built
//! fresh per query and every connection owns its own tool session.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pokechat::pokechat::config::ChatConfig;
//! use pokechat::pokechat::session_channel::{HttpToolTransport, SessionChannel};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! pokechat::init_logger();
//!
//! let config = ChatConfig::from_env();
//! let transport = HttpToolTransport::new(&config.tool_host_url);
//! let session = SessionChannel::connect(Box::new(transport)).await?;
//! println!("{} tools available", session.known_tools().len());
//! # Ok(())
//! # }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// Diagnostics are driven by `RUST_LOG`; calling this more than once is
/// harmless.
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

pub mod pokechat;

// Re-exporting key items for easier external access.
pub use pokechat::client_wrapper::{ClientWrapper, Message, Role, ToolCall, ToolChoice};
pub use pokechat::clients;
pub use pokechat::config::ChatConfig;
pub use pokechat::error::ChatError;
pub use pokechat::orchestrator::ChatOrchestrator;
pub use pokechat::session_channel::{HttpToolTransport, SessionChannel, SessionState};
pub use pokechat::tool_protocol::{ToolMetadata, ToolProtocol, ToolResult};
pub use pokechat::tool_server::UnifiedToolServer;
