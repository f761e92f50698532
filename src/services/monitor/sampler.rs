use std::sync::Arc;
use tokio::time::Instant;

use super::sample::{lifecycle_event, HealthSample};
use super::shutdown::RunState;
use super::status::StatusBoard;
use crate::config::MonitorConfig;
use crate::services::chain::{ChainClient, ChainError, WitnessStatus};
use crate::services::events::{EventSink, Severity};
use crate::services::metrics::WitnessMetricsCollector;

/// Owns the poll → report → wait cadence
pub struct HealthSampler {
    client: Arc<dyn ChainClient>,
    sink: Arc<dyn EventSink>,
    config: Arc<MonitorConfig>,
    metrics: Option<Arc<WitnessMetricsCollector>>,
    status: Option<StatusBoard>,
    previous: Option<WitnessStatus>,
}

impl HealthSampler {
    pub fn new(client: Arc<dyn ChainClient>, sink: Arc<dyn EventSink>, config: Arc<MonitorConfig>) -> Self {
        Self {
            client,
            sink,
            config,
            metrics: None,
            status: None,
            previous: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<WitnessMetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_status(mut self, status: StatusBoard) -> Self {
        self.status = Some(status);
        self
    }

    /// Poll until stop is requested or a fatal error occurs.
    /// Returns the number of successful cycles.
    pub async fn run(&mut self, run_state: &RunState) -> Result<u64, ChainError> {
        let mut cycles = 0u64;
        let mut failures = 0u32;

        while !run_state.is_stop_requested() {
            let started = Instant::now();

            match self.poll_once().await {
                Ok(sample) => {
                    failures = 0;
                    cycles += 1;

                    if let Some(metrics) = &self.metrics {
                        metrics.record_sample(&sample, started.elapsed());
                    }
                    if let Some(status) = &self.status {
                        status.record_sample(&sample).await;
                    }
                    self.report(&sample).await;

                    run_state.sleep(self.config.poll_interval).await;
                }
                Err(err) if err.is_transient() && self.config.retry.should_retry(failures) => {
                    let delay = self.config.retry.calculate_delay(failures);
                    failures += 1;

                    if let Some(metrics) = &self.metrics {
                        metrics.record_failure("transient", started.elapsed());
                    }
                    if let Some(status) = &self.status {
                        status.record_failure(&err.to_string()).await;
                    }

                    let label = format!(
                        "Node unavailable, retry {}/{} in {:.1}s",
                        failures,
                        self.config.retry.max_attempts,
                        delay.as_secs_f64()
                    );
                    self.sink
                        .emit(
                            lifecycle_event(&self.config, Severity::Warning, &label)
                                .with_field("error", err.to_string())
                                .with_field("attempt", failures),
                        )
                        .await;

                    run_state.sleep(delay).await;
                }
                Err(err) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_failure("fatal", started.elapsed());
                    }
                    if let Some(status) = &self.status {
                        status.record_failure(&err.to_string()).await;
                    }
                    return Err(err);
                }
            }
        }

        Ok(cycles)
    }

    /// One attempt: fetch witness status, then the head block.
    /// Nothing is emitted here; a failed fetch leaves no trace in the sink.
    pub async fn poll_once(&mut self) -> Result<HealthSample, ChainError> {
        let status = self.client.fetch_witness_status(&self.config.account).await?;
        let head = self.client.fetch_head_block_number().await?;

        let sample = HealthSample::new(&self.config, status, head, self.previous.as_ref());
        self.previous = Some(status);
        Ok(sample)
    }

    async fn report(&self, sample: &HealthSample) {
        self.sink.emit(sample.to_event(&self.config.app_name)).await;

        if let Some(missed) = sample.missed_since_last.filter(|m| *m > 0) {
            let label = format!("Missed blocks increased by {} (total {})", missed, sample.total_missed);
            self.sink
                .emit(
                    lifecycle_event(&self.config, Severity::Warning, &label)
                        .with_field("total_missed", sample.total_missed)
                        .with_field("missed_since_last", missed),
                )
                .await;
        }
    }
}
