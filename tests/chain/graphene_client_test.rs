// =============================================================================
// INTEGRATION TESTS - GRAPHENE CLIENT
// Runs the client against a local fake node speaking the database API
// =============================================================================

use axum::{routing::post, Router};
use std::time::Duration;
use witness_health_monitor::config::{default_known_chains, ChainIdentity};
use witness_health_monitor::services::chain::{ChainClient, ChainError, GrapheneClient};

use crate::common::fake_node::{free_addr, spawn_node, spawn_router, VIN_CHAIN_ID};

const OTHER_CHAIN_ID: &str = "4018d7844c78f6a6c41c6a552b898022310fc5dec06da467ee7905a8dad512c8";

fn vin() -> ChainIdentity {
    default_known_chains().remove("VIN").unwrap()
}

fn timeout() -> Duration {
    Duration::from_secs(5)
}

#[tokio::test]
async fn test_connect_and_sample() {
    let (node, fake) = spawn_node(VIN_CHAIN_ID, None).await;

    let client = GrapheneClient::connect(&node, vin(), timeout()).await.unwrap();
    assert!(client.url().starts_with("http://127.0.0.1:"));

    let status = client.fetch_witness_status("abetterbid").await.unwrap();
    assert_eq!(status.total_missed, 3);
    assert_eq!(status.last_confirmed_block_num, 1000);
    assert_eq!(client.fetch_head_block_number().await.unwrap(), 1002);
    assert_eq!(fake.witness_calls(), 1);
}

#[tokio::test]
async fn test_connect_rejects_other_chain() {
    let (node, _) = spawn_node(OTHER_CHAIN_ID, None).await;

    let result = GrapheneClient::connect(&node, vin(), timeout()).await;

    match result {
        Err(ChainError::ChainMismatch { expected, actual }) => {
            assert_eq!(expected, vin().chain_id);
            assert_eq!(actual, OTHER_CHAIN_ID);
        }
        other => panic!("expected chain mismatch, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let (node, _) = spawn_node(VIN_CHAIN_ID, None).await;
    let client = GrapheneClient::new(&node, vin(), timeout()).unwrap();

    let err = client.fetch_witness_status("nobody").await.unwrap_err();

    assert!(matches!(err, ChainError::WitnessNotFound(ref account) if account == "nobody"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_rpc_error_object() {
    let (node, _) = spawn_node(VIN_CHAIN_ID, Some("Assert Exception: database API not enabled")).await;
    let client = GrapheneClient::new(&node, vin(), timeout()).unwrap();

    let err = client.fetch_head_block_number().await.unwrap_err();

    assert!(matches!(err, ChainError::Rpc(ref message) if message.contains("database API")));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_unreachable_node_is_transient() {
    let addr = free_addr().await;

    let client = GrapheneClient::new(&format!("ws://{}/", addr), vin(), timeout()).unwrap();
    let err = client.fetch_witness_status("abetterbid").await.unwrap_err();

    assert!(matches!(err, ChainError::Network(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_slow_node_hits_request_timeout() {
    let app = Router::new().route(
        "/",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            "{}"
        }),
    );
    let addr = spawn_router(app).await;
    let client = GrapheneClient::new(&format!("http://{}/", addr), vin(), Duration::from_millis(200)).unwrap();

    let started = std::time::Instant::now();
    let err = client.fetch_head_block_number().await.unwrap_err();

    assert!(matches!(err, ChainError::Network(_)), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_garbage_body_is_parse_error() {
    let addr = spawn_router(Router::new().route("/", post(|| async { "<html>bad gateway</html>" }))).await;
    let client = GrapheneClient::new(&format!("http://{}/", addr), vin(), timeout()).unwrap();

    let err = client.fetch_head_block_number().await.unwrap_err();

    assert!(matches!(err, ChainError::Parse(_)));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let app = Router::new().route(
        "/",
        post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let addr = spawn_router(app).await;
    let client = GrapheneClient::new(&format!("http://{}/", addr), vin(), timeout()).unwrap();

    let err = client.fetch_witness_status("abetterbid").await.unwrap_err();

    assert!(err.is_transient(), "{:?}", err);
}
