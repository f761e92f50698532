use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::client::{BlockNumber, ChainClient, ChainError, WitnessStatus};
use crate::config::ChainIdentity;

/// JSON-RPC client for Graphene-family nodes (BitShares, VinChain, ...).
///
/// Talks to the `database` API over HTTP. Websocket endpoints are reached
/// through the same port, so `ws://` and `wss://` are mapped to `http://` and
/// `https://`.
pub struct GrapheneClient {
    client: reqwest::Client,
    url: String,
    chain: ChainIdentity,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObj>,
}

#[derive(Deserialize)]
struct RpcErrorObj {
    message: String,
}

#[derive(Deserialize)]
struct ChainProperties {
    chain_id: String,
}

#[derive(Deserialize)]
struct WitnessObject {
    total_missed: u64,
    last_confirmed_block_num: u64,
}

#[derive(Deserialize)]
struct DynamicGlobalProperties {
    head_block_number: u64,
}

impl GrapheneClient {
    /// Create a client without checking the node's chain id.
    /// Every request is bounded by `timeout`.
    pub fn new(node: &str, chain: ChainIdentity, timeout: Duration) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::Network(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: http_endpoint(node),
            chain,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a client and make sure the node serves the expected chain
    pub async fn connect(node: &str, chain: ChainIdentity, timeout: Duration) -> Result<Self, ChainError> {
        let client = Self::new(node, chain, timeout)?;

        let properties: ChainProperties = client.call_database("get_chain_properties", json!([])).await?;
        if properties.chain_id != client.chain.chain_id {
            return Err(ChainError::ChainMismatch {
                expected: client.chain.chain_id.clone(),
                actual: properties.chain_id,
            });
        }

        tracing::debug!(
            "Connected to {} ({} chain {})",
            client.url,
            client.chain.core_symbol,
            client.chain.chain_id
        );

        Ok(client)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn chain(&self) -> &ChainIdentity {
        &self.chain
    }

    async fn call_database<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        self.call_rpc::<Option<T>>(method, params)
            .await?
            .ok_or_else(|| ChainError::Parse(format!("{} returned null", method)))
    }

    /// Issue `call(database, method, params)`; a JSON `null` result maps to `None`
    async fn call_rpc<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": ["database", method, params],
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
        });

        let response = self.client.post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ChainError::Network(e.to_string()))?;

        if response.status().is_server_error() {
            return Err(ChainError::Network(format!("{} answered {}", self.url, response.status())));
        }

        let rpc_response: RpcResponse<Value> = response.json()
            .await
            .map_err(|e| ChainError::Parse(e.to_string()))?;

        if let Some(err) = rpc_response.error {
            return Err(ChainError::Rpc(err.message));
        }

        serde_json::from_value(rpc_response.result.unwrap_or(Value::Null))
            .map_err(|e| ChainError::Parse(format!("{}: {}", method, e)))
    }
}

#[async_trait]
impl ChainClient for GrapheneClient {
    async fn fetch_witness_status(&self, account: &str) -> Result<WitnessStatus, ChainError> {
        let witness: Option<WitnessObject> = self
            .call_rpc("get_witness_by_account", json!([account]))
            .await?;

        let witness = witness.ok_or_else(|| ChainError::WitnessNotFound(account.to_string()))?;

        Ok(WitnessStatus {
            total_missed: witness.total_missed,
            last_confirmed_block_num: witness.last_confirmed_block_num,
        })
    }

    async fn fetch_head_block_number(&self) -> Result<BlockNumber, ChainError> {
        let properties: DynamicGlobalProperties = self
            .call_database("get_dynamic_global_properties", json!([]))
            .await?;
        Ok(properties.head_block_number)
    }
}

/// Map a websocket node address to its HTTP equivalent
pub fn http_endpoint(node: &str) -> String {
    if let Some(rest) = node.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = node.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        node.to_string()
    }
}
