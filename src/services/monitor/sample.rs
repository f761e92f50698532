use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::MonitorConfig;
use crate::services::chain::{BlockNumber, WitnessStatus};
use crate::services::events::{HealthEvent, Severity};

/// Result of one successful poll cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSample {
    pub timestamp: DateTime<Utc>,
    pub node_address: String,
    pub account: String,
    pub total_missed: u64,
    pub last_confirmed_block_num: BlockNumber,
    pub head_block_num: BlockNumber,
    /// Increase of `total_missed` since the previous sample of the run
    pub missed_since_last: Option<u64>,
}

impl HealthSample {
    pub fn new(
        config: &MonitorConfig,
        status: WitnessStatus,
        head_block_num: BlockNumber,
        previous: Option<&WitnessStatus>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            node_address: config.node_address.clone(),
            account: config.account.clone(),
            total_missed: status.total_missed,
            last_confirmed_block_num: status.last_confirmed_block_num,
            head_block_num,
            missed_since_last: previous.map(|p| status.total_missed.saturating_sub(p.total_missed)),
        }
    }

    /// Blocks between the chain head and the witness's last confirmed block
    pub fn block_lag(&self) -> u64 {
        self.head_block_num.saturating_sub(self.last_confirmed_block_num)
    }

    pub fn to_event(&self, app_name: &str) -> HealthEvent {
        let mut event = HealthEvent::info(format!(
            "{}: Node's response. Current block-{}, missed blocks-{} ({} - {})",
            app_name, self.last_confirmed_block_num, self.total_missed, self.node_address, self.account
        ))
        .with_field("node", self.node_address.as_str())
        .with_field("account", self.account.as_str())
        .with_field("total_missed", self.total_missed)
        .with_field("last_node_block", self.last_confirmed_block_num)
        .with_field("last_blockchain_block", self.head_block_num)
        .with_field("block_lag", self.block_lag());

        if let Some(missed) = self.missed_since_last {
            event = event.with_field("missed_since_last", missed);
        }
        event.timestamp = self.timestamp;
        event
    }
}

/// Event describing a lifecycle step of the monitor, e.g. "Starting..."
pub fn lifecycle_event(config: &MonitorConfig, severity: Severity, label: &str) -> HealthEvent {
    HealthEvent::new(
        severity,
        format!("{}: {}  ({} - {})", config.app_name, label, config.node_address, config.account),
    )
    .with_field("node", config.node_address.as_str())
    .with_field("account", config.account.as_str())
}
