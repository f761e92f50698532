use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type BlockNumber = u64;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Witness not found for account: {0}")]
    WitnessNotFound(String),
    #[error("Chain mismatch: expected {expected}, node reports {actual}")]
    ChainMismatch { expected: String, actual: String },
}

impl ChainError {
    /// Only transport failures are worth retrying; everything else is a
    /// persistent condition on the node side.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::Network(_))
    }
}

/// On-chain status of a witness at the time of the poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessStatus {
    pub total_missed: u64,
    pub last_confirmed_block_num: BlockNumber,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn fetch_witness_status(&self, account: &str) -> Result<WitnessStatus, ChainError>;
    async fn fetch_head_block_number(&self) -> Result<BlockNumber, ChainError>;
}
