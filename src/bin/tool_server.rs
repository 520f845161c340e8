//! The tool host: registers every battle-strategy tool protocol and serves
//! the discovery/execution HTTP surface the chat front end's sessions speak.

use std::sync::Arc;

use pokechat::pokechat::tool_protocols::{PokedexProtocol, TeamProtocol, TypeChartProtocol};
use pokechat::pokechat::tool_server::{self, UnifiedToolServer};
use pokechat::pokechat::tools::pokedex::PokeApiClient;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8050";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pokechat::init_logger();

    let bind_addr =
        std::env::var("POKECHAT_TOOL_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    // One Pokédex client shared by every protocol, so their lookups share
    // the cache.
    let dex = Arc::new(PokeApiClient::new());

    let server = UnifiedToolServer::new();
    server.register_protocol(Arc::new(TypeChartProtocol)).await?;
    server
        .register_protocol(Arc::new(PokedexProtocol::new(dex.clone())))
        .await?;
    server
        .register_protocol(Arc::new(TeamProtocol::new(dex)))
        .await?;
    log::info!("tool host serving {} tool(s)", server.tool_count().await);

    let app = tool_server::router(server);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("tool host on {}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
