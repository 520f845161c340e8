//! The tool host: a registry of tool protocols behind a small HTTP surface.
//!
//! [`UnifiedToolServer`] aggregates the domain protocols (type chart,
//! Pokédex, team building) and routes execution requests to whichever
//! protocol advertised the requested tool. [`router`] wraps the registry in
//! the wire protocol the chat front end's session transport speaks:
//!
//! ```text
//! GET  /tools    → Vec<ToolMetadata>
//! POST /execute  → { "tool": name, "parameters": {...} } → ToolResult
//! ```
//!
//! Registry misses map to 404; a tool that runs but fails reports a failure
//! `ToolResult` with status 200, so the caller can fold the error into the
//! conversation instead of treating it as a transport fault.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::pokechat::tool_protocol::{ToolError, ToolMetadata, ToolProtocol, ToolResult};

/// Routes tool calls to the protocol that advertised each tool name.
///
/// Thread-safe; clone it freely, all clones share one registry.
#[derive(Clone, Default)]
pub struct UnifiedToolServer {
    tools: Arc<RwLock<HashMap<String, Arc<dyn ToolProtocol>>>>,
}

impl UnifiedToolServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every tool a protocol advertises, keyed by tool name.
    ///
    /// A later registration of the same tool name replaces the earlier one.
    pub async fn register_protocol(
        &self,
        protocol: Arc<dyn ToolProtocol>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let advertised = protocol.list_tools().await?;
        let mut tools = self.tools.write().await;
        for metadata in advertised {
            log::info!(
                "registering tool {} from protocol {}",
                metadata.name,
                protocol.protocol_name()
            );
            tools.insert(metadata.name, protocol.clone());
        }
        Ok(())
    }

    pub async fn has_tool(&self, tool_name: &str) -> bool {
        self.tools.read().await.contains_key(tool_name)
    }

    pub async fn tool_count(&self) -> usize {
        self.tools.read().await.len()
    }

    /// Execute one tool by routing to the protocol that owns it.
    pub async fn execute(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolResult, Box<dyn Error + Send + Sync>> {
        let tools = self.tools.read().await;
        let protocol = tools.get(tool_name).cloned().ok_or_else(|| {
            Box::new(ToolError::NotFound(tool_name.to_string())) as Box<dyn Error + Send + Sync>
        })?;
        // Release the read lock before the (possibly slow) execution.
        drop(tools);

        protocol.execute(tool_name, parameters).await
    }

    /// Aggregate the metadata of every registered tool, sorted by name so
    /// the advertised order is stable across requests.
    pub async fn list_tools(&self) -> Vec<ToolMetadata> {
        let tools = self.tools.read().await;
        let protocols: Vec<Arc<dyn ToolProtocol>> = tools.values().cloned().collect();
        drop(tools);

        let mut all_tools = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for protocol in protocols {
            match protocol.list_tools().await {
                Ok(tool_list) => {
                    for metadata in tool_list {
                        if seen.insert(metadata.name.clone()) {
                            all_tools.push(metadata);
                        }
                    }
                }
                Err(e) => {
                    log::warn!("protocol failed to list tools: {}", e);
                }
            }
        }
        all_tools.sort_by(|a, b| a.name.cmp(&b.name));
        all_tools
    }
}

/// Build the HTTP surface over a populated registry.
pub fn router(server: UnifiedToolServer) -> Router {
    Router::new()
        .route("/tools", get(list_tools_handler))
        .route("/execute", post(execute_handler))
        .with_state(server)
}

async fn list_tools_handler(State(server): State<UnifiedToolServer>) -> impl IntoResponse {
    Json(server.list_tools().await)
}

async fn execute_handler(
    State(server): State<UnifiedToolServer>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let tool_name = payload["tool"].as_str().unwrap_or("").to_string();
    let parameters = payload["parameters"].clone();
    log::info!("executing {} with {}", tool_name, parameters);

    match server.execute(&tool_name, parameters).await {
        Ok(result) => (StatusCode::OK, Json(json!(result))).into_response(),
        Err(e) => {
            if e.downcast_ref::<ToolError>()
                .map(|te| matches!(te, ToolError::NotFound(_)))
                .unwrap_or(false)
            {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            } else {
                // A tool that ran and failed is still a well-formed reply.
                (
                    StatusCode::OK,
                    Json(json!(ToolResult::failure(e.to_string()))),
                )
                    .into_response()
            }
        }
    }
}
