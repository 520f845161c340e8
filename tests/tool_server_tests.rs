//! HTTP-surface tests for the tool host router, driven through tower's
//! `oneshot` without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use pokechat::pokechat::tool_protocols::{PokedexProtocol, TypeChartProtocol};
use pokechat::pokechat::tool_server::{router, UnifiedToolServer};
use pokechat::pokechat::tools::pokedex::PokeApiClient;

async fn typechart_router() -> axum::Router {
    let server = UnifiedToolServer::new();
    server
        .register_protocol(Arc::new(TypeChartProtocol))
        .await
        .unwrap();
    router(server)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn discovery_lists_every_registered_tool() {
    let app = typechart_router().await;

    let response = app
        .oneshot(Request::get("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let tools = body_json(response).await;
    let names: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"get_type_effectiveness"));
    assert!(names.contains(&"get_defensive_profile"));
}

#[tokio::test]
async fn execute_returns_the_tool_result() {
    let app = typechart_router().await;

    let payload = json!({
        "tool": "get_type_effectiveness",
        "parameters": {"attacking_type": "fire", "defending_types": ["grass", "steel"]}
    });
    let response = app
        .oneshot(
            Request::post("/execute")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], true);
    assert_eq!(result["output"]["combined_multiplier"], 4.0);
}

#[tokio::test]
async fn unknown_tool_is_a_404() {
    let app = typechart_router().await;

    let payload = json!({"tool": "summon_arceus", "parameters": {}});
    let response = app
        .oneshot(
            Request::post("/execute")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("summon_arceus"));
}

#[tokio::test]
async fn tool_reported_failures_keep_status_200() {
    // Unroutable Pokédex upstream: get_pokemon runs and fails inside the
    // tool, which the wire reports as a failure result, not a transport
    // error.
    let server = UnifiedToolServer::new();
    let dex = Arc::new(PokeApiClient::with_base_url("http://127.0.0.1:1"));
    server
        .register_protocol(Arc::new(PokedexProtocol::new(dex)))
        .await
        .unwrap();
    let app = router(server);

    let payload = json!({"tool": "get_pokemon", "parameters": {"name_or_id": "missingno"}});
    let response = app
        .oneshot(
            Request::post("/execute")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().is_some());
}

#[tokio::test]
async fn invalid_type_names_surface_as_failures() {
    let app = typechart_router().await;

    let payload = json!({
        "tool": "get_type_effectiveness",
        "parameters": {"attacking_type": "shadow", "defending_types": ["grass"]}
    });
    let response = app
        .oneshot(
            Request::post("/execute")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let result = body_json(response).await;
    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().contains("unknown type"));
}
