use std::sync::Arc;
use std::time::Duration;

use super::MetricsRegistry;
use crate::services::monitor::HealthSample;

/// Collector for witness polling metrics
pub struct WitnessMetricsCollector {
    metrics: Arc<MetricsRegistry>,
}

impl WitnessMetricsCollector {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn record_sample(&self, sample: &HealthSample, elapsed: Duration) {
        let account = sample.account.as_str();

        self.metrics
            .witness_total_missed
            .with_label_values(&[account])
            .set(sample.total_missed as f64);

        self.metrics
            .witness_last_confirmed_block
            .with_label_values(&[account])
            .set(sample.last_confirmed_block_num as f64);

        self.metrics
            .witness_block_lag
            .with_label_values(&[account])
            .set(sample.block_lag() as f64);

        self.metrics
            .head_block
            .with_label_values(&[sample.node_address.as_str()])
            .set(sample.head_block_num as f64);

        self.metrics
            .poll_cycles_total
            .with_label_values(&["success"])
            .inc();

        self.metrics
            .poll_duration_seconds
            .observe(elapsed.as_secs_f64());
    }

    /// `outcome` is either "transient" or "fatal"
    pub fn record_failure(&self, outcome: &str, elapsed: Duration) {
        self.metrics
            .poll_cycles_total
            .with_label_values(&[outcome])
            .inc();

        self.metrics
            .poll_duration_seconds
            .observe(elapsed.as_secs_f64());
    }
}
