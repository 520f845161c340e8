//! The chat front end: serves the static chat page and drives one
//! tool-augmented query cycle per incoming WebSocket message.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{Html, Response};
use axum::routing::{any, get};
use axum::Router;

use pokechat::pokechat::config::ChatConfig;
use pokechat::pokechat::connection;
use pokechat::pokechat::orchestrator::ChatOrchestrator;
use pokechat::pokechat::clients::openai::OpenAIClient;

const CHAT_PAGE: &str = include_str!("chat_page.html");

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<ChatOrchestrator>,
    config: Arc<ChatConfig>,
}

async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| {
        connection::serve_socket(socket, state.orchestrator, state.config)
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pokechat::init_logger();

    let config = Arc::new(ChatConfig::from_env());
    if config.api_key.is_empty() {
        log::warn!("OPEN_AI_SECRET is not set; model calls will be rejected upstream");
    }

    let client = Arc::new(match &config.api_base_url {
        Some(base_url) => OpenAIClient::new_with_base_url(&config.api_key, &config.model, base_url),
        None => OpenAIClient::new_with_model_string(&config.api_key, &config.model),
    }
    .with_timeout(config.request_timeout));

    let orchestrator = Arc::new(ChatOrchestrator::new(client, config.system_prompt.clone()));

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", any(ws_handler))
        .with_state(AppState {
            orchestrator,
            config: config.clone(),
        });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!(
        "chat server on {} (model {}, tools at {})",
        config.bind_addr,
        config.model,
        config.tool_host_url
    );
    axum::serve(listener, app).await?;
    Ok(())
}
