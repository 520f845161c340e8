//! Error taxonomy for the chat assistant.
//!
//! Failures are classified by how far they are allowed to propagate:
//!
//! - [`ChatError::Connection`] is fatal to the client connection — the
//!   session channel could not be established or maintained.
//! - [`ChatError::Protocol`], [`ChatError::ToolExecution`] and
//!   [`ChatError::Model`] are fatal to the current query cycle only; the
//!   connection loop reports them in-band and keeps serving.
//! - [`ChatError::Internal`] covers everything unclassified, caught at the
//!   connection loop boundary.

use std::error::Error;
use std::fmt;

/// Error type threaded through the session channel, translator and
/// orchestrator contracts.
#[derive(Debug, Clone)]
pub enum ChatError {
    /// The tool-host transport or discovery handshake could not be
    /// established or maintained. Fatal to the connection.
    Connection(String),
    /// Malformed or unexpected reply from the tool host or the model
    /// (missing field, non-success status, undecodable body).
    Protocol(String),
    /// A specific requested tool call could not be dispatched.
    ToolExecution { name: String, cause: String },
    /// The upstream model call failed (transport, quota, timeout).
    Model(String),
    /// Unclassified failure caught at the connection loop boundary.
    Internal(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Connection(msg) => write!(f, "connection error: {}", msg),
            ChatError::Protocol(msg) => write!(f, "protocol error: {}", msg),
            ChatError::ToolExecution { name, cause } => {
                write!(f, "tool '{}' failed: {}", name, cause)
            }
            ChatError::Model(msg) => write!(f, "model error: {}", msg),
            ChatError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl Error for ChatError {}

impl ChatError {
    /// Whether the error should tear down the whole client connection
    /// rather than just the current query cycle.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, ChatError::Connection(_))
    }
}
