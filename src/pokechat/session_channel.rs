//! One logical connection from the orchestrator to the tool host.
//!
//! A [`SessionChannel`] is owned by exactly one client connection: it is
//! created when the connection is accepted, carries the discovered tool
//! descriptors for that connection, and is closed on every exit path. It is
//! never shared or stored in process-wide state.
//!
//! The transport itself sits behind the [`ToolTransport`] trait so the
//! production HTTP transport and test doubles plug into the same state
//! machine.

use async_trait::async_trait;
use std::time::Duration;

use crate::pokechat::error::ChatError;
use crate::pokechat::tool_protocol::{ToolMetadata, ToolResult};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Lifecycle state of a session channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unconnected,
    Connecting,
    Ready,
    Closed,
}

/// Transport seam between the session channel and the tool host.
///
/// `open` acquires whatever underlying resources the transport needs and
/// `close` releases them; the channel guarantees that every successful or
/// partially-successful `open` is matched by exactly one `close`.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Acquire the underlying transport resources.
    async fn open(&mut self) -> Result<(), ChatError>;

    /// Query the host's current tool set.
    async fn fetch_tools(&self) -> Result<Vec<ToolMetadata>, ChatError>;

    /// Send one structured call and await its structured reply.
    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ChatError>;

    /// Release the underlying transport resources.
    async fn close(&mut self) -> Result<(), ChatError>;
}

/// HTTP transport speaking the tool host's wire protocol:
/// `GET /tools` for discovery and `POST /execute` for invocation.
pub struct HttpToolTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpToolTransport {
    /// Create a transport for the given tool-host base URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl ToolTransport for HttpToolTransport {
    async fn open(&mut self) -> Result<(), ChatError> {
        // The HTTP transport holds no per-connection state on the wire;
        // the discovery request performed by `SessionChannel::connect`
        // doubles as the reachability handshake.
        Ok(())
    }

    async fn fetch_tools(&self) -> Result<Vec<ToolMetadata>, ChatError> {
        let response = self
            .client
            .get(format!("{}/tools", self.endpoint))
            .send()
            .await
            .map_err(|e| ChatError::Protocol(format!("tool discovery failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ChatError::Protocol(format!(
                "tool host returned status {} on discovery",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ChatError::Protocol(format!("undecodable tool list: {}", e)))
    }

    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ChatError> {
        let response = self
            .client
            .post(format!("{}/execute", self.endpoint))
            .json(&serde_json::json!({ "tool": name, "parameters": arguments }))
            .send()
            .await
            .map_err(|e| ChatError::ToolExecution {
                name: name.to_string(),
                cause: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ChatError::ToolExecution {
                name: name.to_string(),
                cause: format!("tool host returned status {}", response.status()),
            });
        }

        response.json().await.map_err(|e| ChatError::ToolExecution {
            name: name.to_string(),
            cause: format!("undecodable tool result: {}", e),
        })
    }

    async fn close(&mut self) -> Result<(), ChatError> {
        Ok(())
    }
}

/// Per-connection session: transport handle, the tool descriptors known to
/// this session, and the lifecycle state.
pub struct SessionChannel {
    transport: Box<dyn ToolTransport>,
    tools: Vec<ToolMetadata>,
    state: SessionState,
}

impl std::fmt::Debug for SessionChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionChannel")
            .field("tools", &self.tools)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SessionChannel {
    /// Establish the transport, perform the discovery handshake, and return
    /// a Ready session with a fully populated tool list.
    ///
    /// On any failure the partially-acquired transport is released before
    /// the error is returned — callers never see a half-connected session.
    pub async fn connect(mut transport: Box<dyn ToolTransport>) -> Result<Self, ChatError> {
        if let Err(e) = transport.open().await {
            release_transport(&mut transport).await;
            return Err(ChatError::Connection(format!(
                "transport open failed: {}",
                e
            )));
        }

        match transport.fetch_tools().await {
            Ok(tools) => {
                log::info!("session ready with {} tool(s)", tools.len());
                Ok(Self {
                    transport,
                    tools,
                    state: SessionState::Ready,
                })
            }
            Err(e) => {
                release_transport(&mut transport).await;
                Err(ChatError::Connection(format!(
                    "tool discovery handshake failed: {}",
                    e
                )))
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Tool descriptors discovered by the most recent successful query.
    pub fn known_tools(&self) -> &[ToolMetadata] {
        &self.tools
    }

    /// Re-query the host's current tool set, refreshing the session's
    /// descriptor snapshot. A failed query leaves the session unchanged.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolMetadata>, ChatError> {
        if self.state != SessionState::Ready {
            return Err(ChatError::Protocol(format!(
                "list_tools on session in state {:?}",
                self.state
            )));
        }
        let tools = self.transport.fetch_tools().await?;
        self.tools = tools.clone();
        Ok(tools)
    }

    /// Send one structured call and await its structured reply. A failed
    /// invocation does not corrupt the session or block later invocations.
    pub async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ChatError> {
        if self.state != SessionState::Ready {
            return Err(ChatError::ToolExecution {
                name: name.to_string(),
                cause: format!("session in state {:?}", self.state),
            });
        }
        self.transport.invoke(name, arguments).await
    }

    /// Release all resources associated with the session. Idempotent, and
    /// never raises — a teardown failure must not mask whichever error
    /// triggered it, so it is logged and swallowed here.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.tools.clear();
        release_transport(&mut self.transport).await;
    }
}

async fn release_transport(transport: &mut Box<dyn ToolTransport>) {
    if let Err(e) = transport.close().await {
        log::warn!("transport close reported: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Transport double counting opens and closes, optionally failing at a
    /// chosen step.
    struct CountingTransport {
        opens: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        fail_open: bool,
        fail_discovery: bool,
    }

    impl CountingTransport {
        fn new(
            opens: Arc<AtomicUsize>,
            closes: Arc<AtomicUsize>,
        ) -> Self {
            Self {
                opens,
                closes,
                fail_open: false,
                fail_discovery: false,
            }
        }
    }

    #[async_trait]
    impl ToolTransport for CountingTransport {
        async fn open(&mut self) -> Result<(), ChatError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if self.fail_open {
                return Err(ChatError::Connection("refused".into()));
            }
            Ok(())
        }

        async fn fetch_tools(&self) -> Result<Vec<ToolMetadata>, ChatError> {
            if self.fail_discovery {
                return Err(ChatError::Protocol("discovery down".into()));
            }
            Ok(vec![ToolMetadata::new("get_pokemon", "Pokédex lookup")])
        }

        async fn invoke(
            &self,
            _name: &str,
            _arguments: serde_json::Value,
        ) -> Result<ToolResult, ChatError> {
            Ok(ToolResult::success(serde_json::json!({"ok": true})))
        }

        async fn close(&mut self) -> Result<(), ChatError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
    }

    #[tokio::test]
    async fn connect_populates_tools_before_ready() {
        let (opens, closes) = counters();
        let session = SessionChannel::connect(Box::new(CountingTransport::new(
            opens.clone(),
            closes.clone(),
        )))
        .await
        .unwrap();

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.known_tools().len(), 1);
        assert_eq!(session.known_tools()[0].name, "get_pokemon");
    }

    #[tokio::test]
    async fn failed_handshake_releases_the_transport() {
        let (opens, closes) = counters();
        let mut transport = CountingTransport::new(opens.clone(), closes.clone());
        transport.fail_discovery = true;

        let err = SessionChannel::connect(Box::new(transport)).await.unwrap_err();
        assert!(matches!(err, ChatError::Connection(_)));
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_open_is_still_balanced_by_a_close() {
        let (opens, closes) = counters();
        let mut transport = CountingTransport::new(opens.clone(), closes.clone());
        transport.fail_open = true;

        assert!(SessionChannel::connect(Box::new(transport)).await.is_err());
        assert_eq!(opens.load(Ordering::SeqCst), closes.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (opens, closes) = counters();
        let mut session = SessionChannel::connect(Box::new(CountingTransport::new(
            opens.clone(),
            closes.clone(),
        )))
        .await
        .unwrap();

        session.close().await;
        session.close().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invoke_after_close_fails_without_panicking() {
        let (opens, closes) = counters();
        let mut session = SessionChannel::connect(Box::new(CountingTransport::new(opens, closes)))
            .await
            .unwrap();
        session.close().await;

        let err = session
            .invoke("get_pokemon", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::ToolExecution { .. }));
    }
}
