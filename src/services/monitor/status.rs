use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::sample::HealthSample;

/// Process lifecycle: INIT → STARTING → RUNNING → {STOPPING → STOPPED | FAILED}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorPhase {
    Init,
    Starting,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl MonitorPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorPhase::Stopped | MonitorPhase::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub phase: MonitorPhase,
    pub last_sample: Option<HealthSample>,
    pub successful_cycles: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            phase: MonitorPhase::Init,
            last_sample: None,
            successful_cycles: 0,
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

/// Shared, read-mostly view of the monitor for the status endpoints
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<MonitorStatus>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminal phases are final; later transitions are ignored
    pub async fn set_phase(&self, phase: MonitorPhase) {
        let mut status = self.inner.write().await;
        if !status.phase.is_terminal() {
            status.phase = phase;
        }
    }

    /// Move to RUNNING only from STARTING; a stop requested meanwhile wins
    pub async fn mark_running(&self) {
        let mut status = self.inner.write().await;
        if status.phase == MonitorPhase::Starting {
            status.phase = MonitorPhase::Running;
        }
    }

    /// Move to STOPPING only from STARTING or RUNNING
    pub async fn mark_stopping(&self) {
        let mut status = self.inner.write().await;
        if matches!(status.phase, MonitorPhase::Starting | MonitorPhase::Running) {
            status.phase = MonitorPhase::Stopping;
        }
    }

    pub async fn record_sample(&self, sample: &HealthSample) {
        let mut status = self.inner.write().await;
        status.last_sample = Some(sample.clone());
        status.successful_cycles += 1;
        status.consecutive_failures = 0;
    }

    pub async fn record_failure(&self, error: &str) {
        let mut status = self.inner.write().await;
        status.consecutive_failures += 1;
        status.last_error = Some(error.to_string());
    }

    pub async fn phase(&self) -> MonitorPhase {
        self.inner.read().await.phase
    }

    pub async fn snapshot(&self) -> MonitorStatus {
        self.inner.read().await.clone()
    }
}
