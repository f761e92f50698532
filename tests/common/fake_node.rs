#![allow(dead_code)]

//! Local stand-in for a Graphene node answering `call(database, ...)`

use axum::{extract::State, routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const VIN_CHAIN_ID: &str = "b025b3dacd447ae0f9baa148ad5e69e2ec8ca93c0cc6c341b60da8a4b2a29871";

pub struct FakeNode {
    chain_id: String,
    rpc_error: Option<String>,
    witness_calls: AtomicUsize,
}

impl FakeNode {
    pub fn witness_calls(&self) -> usize {
        self.witness_calls.load(Ordering::SeqCst)
    }
}

async fn handle_call(State(node): State<Arc<FakeNode>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();

    if let Some(message) = &node.rpc_error {
        return Json(json!({ "jsonrpc": "2.0", "id": id, "error": { "code": 1, "message": message } }));
    }

    let result = match request["params"][1].as_str() {
        Some("get_chain_properties") => json!({ "id": "2.11.0", "chain_id": node.chain_id }),
        Some("get_dynamic_global_properties") => json!({
            "id": "2.1.0",
            "head_block_number": 1002,
            "time": "2026-10-18T10:00:00",
        }),
        Some("get_witness_by_account") => {
            node.witness_calls.fetch_add(1, Ordering::SeqCst);
            if request["params"][2][0] == "abetterbid" {
                json!({
                    "id": "1.6.12",
                    "witness_account": "1.2.17",
                    "total_missed": 3,
                    "last_confirmed_block_num": 1000,
                })
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    };

    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

/// Serve `app` on an ephemeral local port
pub async fn spawn_router(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start a fake node; returns its `ws://` address
pub async fn spawn_node(chain_id: &str, rpc_error: Option<&str>) -> (String, Arc<FakeNode>) {
    let node = Arc::new(FakeNode {
        chain_id: chain_id.to_string(),
        rpc_error: rpc_error.map(str::to_string),
        witness_calls: AtomicUsize::new(0),
    });
    let addr = spawn_router(Router::new().route("/", post(handle_call)).with_state(node.clone())).await;
    (format!("ws://{}/", addr), node)
}

/// A local address nothing listens on
pub async fn free_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
